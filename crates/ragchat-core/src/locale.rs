//! Locale tables — every user-facing literal the chat core emits.
//!
//! Each `LocaleText` is a static table: placeholder session name, the greeting
//! with its two guided entry points, the scripted guided exchanges, fallback
//! texts, and the FAQ catalog (category label → canned question).

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Locale selector
// ─────────────────────────────────────────────

/// Supported UI languages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ko,
}

impl Locale {
    /// The static text table for this locale.
    pub fn text(self) -> &'static LocaleText {
        match self {
            Locale::En => &EN,
            Locale::Ko => &KO,
        }
    }

    /// Parse a locale code (`"en"`, `"ko"`, case-insensitive).
    pub fn from_code(code: &str) -> Option<Locale> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "ko" => Some(Locale::Ko),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ko => "ko",
        }
    }
}

// ─────────────────────────────────────────────
// Text tables
// ─────────────────────────────────────────────

/// One FAQ catalog row.
#[derive(Clone, Debug)]
pub struct FaqItem {
    /// Button label.
    pub category: &'static str,
    /// Question submitted when the button is pressed.
    pub question: &'static str,
}

/// A scripted guided exchange: what the user "says" and what the bot answers.
#[derive(Clone, Debug)]
pub struct ScriptText {
    /// Button label that triggers the exchange.
    pub label: &'static str,
    pub user_echo: &'static str,
    pub bot_prompt: &'static str,
}

/// All user-facing literals for one locale.
#[derive(Clone, Debug)]
pub struct LocaleText {
    /// Name shown for sessions that have no meaningful message yet.
    pub placeholder_name: &'static str,
    /// Bot greeting shown when a new session starts.
    pub greeting: &'static str,
    /// Guided flow that offers the FAQ categories as buttons.
    pub task_lookup: ScriptText,
    /// Guided flow that asks for merchant details as free text.
    pub merchant_lookup: ScriptText,
    /// Shown when the store answers without an answer.
    pub no_answer: &'static str,
    /// Shown when a send fails.
    pub send_error: &'static str,
    pub faq: &'static [FaqItem],
}

impl LocaleText {
    /// The two greeting buttons, in display order.
    pub fn greeting_buttons(&self) -> Vec<String> {
        vec![
            self.task_lookup.label.to_string(),
            self.merchant_lookup.label.to_string(),
        ]
    }

    /// All FAQ category labels, in catalog order.
    pub fn faq_labels(&self) -> Vec<String> {
        self.faq.iter().map(|f| f.category.to_string()).collect()
    }

    /// Look up the canned question for a FAQ label.
    pub fn faq_question(&self, label: &str) -> Option<&'static str> {
        self.faq
            .iter()
            .find(|f| f.category == label)
            .map(|f| f.question)
    }
}

pub static EN: LocaleText = LocaleText {
    placeholder_name: "new session",
    greeting: "I'm the Onnuri gift certificate assistant. How can I help you?",
    task_lookup: ScriptText {
        label: "task lookup",
        user_echo: "I'd like to look up Onnuri gift certificate services.",
        bot_prompt: "What would you like to know next?",
    },
    merchant_lookup: ScriptText {
        label: "merchant lookup",
        user_echo: "I'd like to look up Onnuri gift certificate merchant information.",
        bot_prompt: "Please fill in at least one of the fields below.\n\
                     Merchant code:\n\
                     Merchant name:\n\
                     Owner name:\n\
                     Owner phone:\n\
                     Business registration number:",
    },
    no_answer: "Could not get an answer.",
    send_error: "An error occurred.",
    faq: &[
        FaqItem {
            category: "Onnuri certificate",
            question: "What is the Onnuri gift certificate?",
        },
        FaqItem {
            category: "Certificate types",
            question: "What types and denominations of Onnuri gift certificates are there?",
        },
        FaqItem {
            category: "Where to use",
            question: "Where can Onnuri gift certificates be used?",
        },
        FaqItem {
            category: "Income deduction",
            question: "What are the traditional market income deduction rules after using Onnuri gift certificates?",
        },
        FaqItem {
            category: "Validity period",
            question: "How long are Onnuri gift certificates valid?",
        },
        FaqItem {
            category: "Merchant sign-up",
            question: "How do I apply to become an Onnuri gift certificate merchant?",
        },
        FaqItem {
            category: "Merchant benefits",
            question: "What benefits do registered Onnuri gift certificate merchants get?",
        },
    ],
};

pub static KO: LocaleText = LocaleText {
    placeholder_name: "새 세션",
    greeting: "저는 온누리 상품권 관련 챗봇입니다. 무엇을 도와드릴까요?",
    task_lookup: ScriptText {
        label: "업무조회",
        user_echo: "온누리 상품권 관련 업무 조회하겠습니다.",
        bot_prompt: "다음으로 무엇을 알고 싶으신가요?",
    },
    merchant_lookup: ScriptText {
        label: "가맹점조회",
        user_echo: "온누리 상품권 가맹점 정보 조회하겠습니다.",
        bot_prompt: "아래 항목 중 한가지 이상 정보를 입력해주세요.\n\
                     가맹점코드:\n\
                     가맹점명:\n\
                     가맹주성함:\n\
                     가맹주번호:\n\
                     사업자번호:",
    },
    no_answer: "답변을 가져올 수 없습니다.",
    send_error: "오류 발생",
    faq: &[
        FaqItem {
            category: "온누리상품권",
            question: "온누리상품권이란 무엇인가요?",
        },
        FaqItem {
            category: "발행 종류",
            question: "온누리상품권의 종류 및 권종에 어떤 것이 있나요?",
        },
        FaqItem {
            category: "사용처",
            question: "온누리상품권의 사용처는 어디인가요?",
        },
        FaqItem {
            category: "소득공제",
            question: "온누리상품권 사용 후 전통시장 소득공제의 기준이 뭔가요?",
        },
        FaqItem {
            category: "유효기간",
            question: "온누리상품권의 유효기간 알려주세요.",
        },
        FaqItem {
            category: "가맹점 가입 방법",
            question: "온누리상품권 가맹점 신청과정을 알려주세요.",
        },
        FaqItem {
            category: "가맹점 혜택",
            question: "온누리 상품권 가맹점으로 등록하면 어떤 혜택이 있나요?",
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_from_code() {
        assert_eq!(Locale::from_code("EN"), Some(Locale::En));
        assert_eq!(Locale::from_code(" ko "), Some(Locale::Ko));
        assert_eq!(Locale::from_code("fr"), None);
    }

    #[test]
    fn test_english_guided_labels() {
        let text = Locale::En.text();
        assert_eq!(
            text.greeting_buttons(),
            vec!["task lookup".to_string(), "merchant lookup".to_string()]
        );
    }

    #[test]
    fn test_faq_lookup() {
        let text = Locale::Ko.text();
        assert_eq!(text.faq_question("사용처"), Some("온누리상품권의 사용처는 어디인가요?"));
        assert_eq!(text.faq_question("없는 항목"), None);
        assert_eq!(text.faq_labels().len(), 7);
    }

    #[test]
    fn test_merchant_prompt_lists_fields() {
        let prompt = Locale::Ko.text().merchant_lookup.bot_prompt;
        assert_eq!(prompt.lines().count(), 6);
        assert!(prompt.lines().all(|l| !l.starts_with(' ')));
    }

    #[test]
    fn test_guided_labels_are_not_faq_labels() {
        for locale in [Locale::En, Locale::Ko] {
            let text = locale.text();
            assert!(text.faq_question(text.task_lookup.label).is_none());
            assert!(text.faq_question(text.merchant_lookup.label).is_none());
        }
    }
}
