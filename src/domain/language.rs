use crate::utils::error::MandiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// UI strings shown on the screen for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Labels {
    pub title: &'static str,
    pub start: &'static str,
    pub product: &'static str,
    pub quantity: &'static str,
    pub location: &'static str,
    pub get_price: &'static str,
    pub error: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Punjabi,
    Tamil,
    Bengali,
}

const ENGLISH: Labels = Labels {
    title: "Multilingual Mandi",
    start: "Start",
    product: "Product",
    quantity: "Quantity (kg)",
    location: "Location",
    get_price: "Get AI Price",
    error: "Please fill all fields correctly",
};

const HINDI: Labels = Labels {
    title: "बहुभाषी मंडी",
    start: "शुरू करें",
    product: "उत्पाद",
    quantity: "मात्रा (किलो)",
    location: "स्थान",
    get_price: "AI मूल्य प्राप्त करें",
    error: "कृपया सही जानकारी भरें",
};

const PUNJABI: Labels = Labels {
    title: "ਬਹੁਭਾਸ਼ੀ ਮੰਡੀ",
    start: "ਸ਼ੁਰੂ ਕਰੋ",
    product: "ਉਤਪਾਦ",
    quantity: "ਮਾਤਰਾ (ਕਿਲੋ)",
    location: "ਸਥਾਨ",
    get_price: "AI ਕੀਮਤ ਲਵੋ",
    error: "ਸਹੀ ਜਾਣਕਾਰੀ ਭਰੋ",
};

const TAMIL: Labels = Labels {
    title: "பல்மொழி சந்தை",
    start: "தொடங்கு",
    product: "பொருள்",
    quantity: "அளவு (கிலோ)",
    location: "இடம்",
    get_price: "AI விலை",
    error: "சரியான தகவலை உள்ளிடவும்",
};

const BENGALI: Labels = Labels {
    title: "বহুভাষিক মান্ডি",
    start: "শুরু করুন",
    product: "পণ্য",
    quantity: "পরিমাণ (কেজি)",
    location: "অবস্থান",
    get_price: "AI মূল্য",
    error: "সঠিক তথ্য দিন",
};

impl Language {
    /// 語言選單的順序
    pub const ALL: [Language; 5] = [
        Language::English,
        Language::Hindi,
        Language::Punjabi,
        Language::Tamil,
        Language::Bengali,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Punjabi => "Punjabi",
            Language::Tamil => "Tamil",
            Language::Bengali => "Bengali",
        }
    }

    pub fn locale_tag(self) -> &'static str {
        match self {
            Language::English => "en-IN",
            Language::Hindi => "hi-IN",
            Language::Punjabi => "pa-IN",
            Language::Tamil => "ta-IN",
            Language::Bengali => "bn-IN",
        }
    }

    /// Two-letter code sent to the pricing service.
    pub fn backend_code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Punjabi => "pa",
            Language::Tamil => "ta",
            Language::Bengali => "bn",
        }
    }

    pub fn labels(self) -> &'static Labels {
        match self {
            Language::English => &ENGLISH,
            Language::Hindi => &HINDI,
            Language::Punjabi => &PUNJABI,
            Language::Tamil => &TAMIL,
            Language::Bengali => &BENGALI,
        }
    }

    pub fn from_backend_code(code: &str) -> Option<Language> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.backend_code().eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Language {
    type Err = MandiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Language::ALL
            .into_iter()
            .find(|lang| {
                lang.name().eq_ignore_ascii_case(needle)
                    || lang.backend_code().eq_ignore_ascii_case(needle)
                    || lang.locale_tag().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| MandiError::UnknownLanguage {
                name: needle.to_string(),
            })
    }
}
