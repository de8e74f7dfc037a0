//! Compiled-in translation tables.
//!
//! Every supported locale has one static `(key, text)` table. Lookups never
//! fail: an unknown locale or key resolves to the key itself so screens
//! render something readable while a string is missing.

use serde::{Deserialize, Serialize};

/// Supported UI locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ar,
}

impl Locale {
    pub const DEFAULT: Locale = Locale::En;
    /// The one locale laid out right-to-left.
    pub const RTL: Locale = Locale::Ar;
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Ar];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ar => "ar",
        }
    }

    pub fn from_code(code: &str) -> Option<Locale> {
        Locale::ALL.into_iter().find(|l| l.code() == code)
    }

    pub fn is_rtl(self) -> bool {
        self == Locale::RTL
    }

    /// Translation key of the locale's own display name.
    pub fn name_key(self) -> &'static str {
        match self {
            Locale::En => "english",
            Locale::Ar => "arabic",
        }
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Locale::En => EN,
            Locale::Ar => AR,
        }
    }
}

/// Look up `key` for the locale identified by `code`.
///
/// Falls back to the raw key when the code is not a supported locale or the
/// table has no entry.
pub fn translate<'a>(code: &str, key: &'a str) -> &'a str {
    let found: Option<&'a str> = Locale::from_code(code).and_then(|locale| lookup(locale, key));
    found.unwrap_or(key)
}

/// Exact table entry for `(locale, key)`, if any.
pub fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    locale
        .table()
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, text)| *text)
}

/// Every key defined for `locale`, in table order.
pub fn keys(locale: Locale) -> impl Iterator<Item = &'static str> {
    locale.table().iter().map(|(k, _)| *k)
}

static EN: &[(&str, &str)] = &[
    // --- Language tab ---
    ("language", "Language"),
    ("languageSelection", "Language Selection"),
    ("english", "English"),
    ("arabic", "Arabic"),
    ("currentLanguage", "Current Language:"),
    ("saveChanges", "Save Changes"),
    // --- Home tabs ---
    ("home", "Home"),
    ("ready", "Ready"),
    ("pickup", "Pickup"),
    ("delivery", "Delivery"),
    ("dineIn", "Dine-in"),
    ("table", "Table"),
    ("sendSMS", "Send SMS"),
    ("pickedUp", "Picked Up"),
    ("restaurantName", "Restaurant Name"),
    ("restaurantHours", "8:00 - 16:00"),
    ("waiterName", "Waiter Name"),
    // --- Order details ---
    ("orderDetails", "Order Details"),
    ("orderNotFound", "Order not found"),
    ("orderStatus", "Order Status"),
    ("refund", "Refund"),
    ("orderedAt", "Ordered At"),
    ("orderType", "Order Type"),
    ("orderPrice", "Order Price"),
    ("itemDetails", "Item Details"),
    ("extras", "Extras:"),
    ("noExtras", "No Extras"),
    ("currency", "EGP"),
    // --- Manager authorization ---
    ("managerAuthorization", "Manager Authorization"),
    ("success", "Success"),
    ("error", "Error"),
    ("refundApproved", "Refund has been approved and processed."),
    ("invalidManagerCode", "Invalid manager code. Please try again."),
    ("cancel", "Cancel"),
    ("clear", "Clear"),
    ("validate", "Validate"),
    // --- Sign-in ---
    (
        "loginPrompt",
        "Login to get started with a seamless restaurant management experience",
    ),
    ("phoneNumber", "Phone Number"),
    ("sendCode", "Send Code"),
    ("confirmOtp", "Confirm OTP"),
    ("resend", "Resend"),
    ("loading", "Loading..."),
];

static AR: &[(&str, &str)] = &[
    // --- Language tab ---
    ("language", "اختيار اللغة"),
    ("languageSelection", "اختيار اللغة"),
    ("english", "الإنجليزية"),
    ("arabic", "العربية"),
    ("currentLanguage", "اللغة الحالية:"),
    ("saveChanges", "حفظ التغييرات"),
    // --- Home tabs ---
    ("home", "الرئيسية"),
    ("ready", "جاهز"),
    ("pickup", "استلام"),
    ("delivery", "توصيل"),
    ("dineIn", "تناول في المطعم"),
    ("table", "طاولة"),
    ("sendSMS", "إرسال رسالة"),
    ("pickedUp", "تم الاستلام"),
    ("restaurantName", "اسم المطعم"),
    ("restaurantHours", "٨:٠٠ - ١٦:٠٠"),
    ("waiterName", "اسم النادل"),
    // --- Order details ---
    ("orderDetails", "تفاصيل الطلب"),
    ("orderNotFound", "الطلب غير موجود"),
    ("orderStatus", "حالة الطلب"),
    ("refund", "استرداد"),
    ("orderedAt", "وقت الطلب"),
    ("orderType", "نوع الطلب"),
    ("orderPrice", "سعر الطلب"),
    ("itemDetails", "تفاصيل العناصر"),
    ("extras", "إضافات:"),
    ("noExtras", "لا توجد إضافات"),
    ("currency", "ج.م"),
    // --- Manager authorization ---
    ("managerAuthorization", "تفويض المدير"),
    ("success", "نجاح"),
    ("error", "خطأ"),
    ("refundApproved", "تمت الموافقة على الاسترداد ومعالجته."),
    ("invalidManagerCode", "رمز المدير غير صالح. يرجى المحاولة مرة أخرى."),
    ("cancel", "إلغاء"),
    ("clear", "مسح"),
    ("validate", "تحقق"),
    // --- Sign-in ---
    ("loginPrompt", "سجّل الدخول لبدء تجربة سلسة لإدارة المطعم"),
    ("phoneNumber", "رقم الهاتف"),
    ("sendCode", "إرسال الرمز"),
    ("confirmOtp", "تأكيد الرمز"),
    ("resend", "إعادة الإرسال"),
    ("loading", "جارٍ التحميل..."),
];
