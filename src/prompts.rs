// src/prompts.rs
use crate::helpers::language::Language;

pub fn build_system_prompt(lang: Language, name: Option<&str>) -> String {
    match lang {
        Language::Swedish => {
            let name_line = name
                .map(|n| format!(" Användarens namn är {}.", n))
                .unwrap_or_default();
            format!(
                "Du är en hjälpsam, kunnig AI med stark språkförståelse och gott minne. \
                 Svara ALLTID på svenska.{} \
                 Var tydlig, trevlig och förklara saker enkelt men korrekt. \
                 Korrigera uppenbara stavfel varsamt utan att ändra betydelsen. \
                 När frågor är komplexa, strukturera svaret med korta stycken eller punktlistor.",
                name_line
            )
        }
        Language::Arabic => {
            let name_line = name
                .map(|n| format!(" اسم المستخدم هو {}.", n))
                .unwrap_or_default();
            format!(
                "أنت مساعد ذكاء اصطناعي متعاون وذو معرفة واسعة. \
                 أجب دائماً باللغة العربية.{} \
                 كن واضحاً وودوداً واشرح الأمور ببساطة وبدقة. \
                 صحح الأخطاء الإملائية الواضحة برفق دون تغيير المعنى. \
                 عند الأسئلة المعقدة، نظّم الإجابة في فقرات قصيرة أو نقاط.",
                name_line
            )
        }
        Language::English => {
            let name_line = name
                .map(|n| format!(" The user's name is {}.", n))
                .unwrap_or_default();
            format!(
                "You are a helpful, knowledgeable AI with strong language understanding and good memory. \
                 Always reply in English.{} \
                 Be clear, friendly, and explain things simply but accurately. \
                 Gently correct obvious typos without changing meaning. \
                 For complex questions, structure the answer with short paragraphs or bullet points.",
                name_line
            )
        }
    }
}

/// System prompt, header and footer for a conversation summary.
pub struct SummaryTemplate {
    pub system: &'static str,
    pub header: &'static str,
    pub footer: &'static str,
}

pub fn summary_template(lang: Language) -> SummaryTemplate {
    match lang {
        Language::Swedish => SummaryTemplate {
            system: "Sammanfatta konversationen kort, vänligt och mänskligt på svenska. \
                     3–5 punkter, och avsluta med en kort varm fråga.",
            header: "--- Sammanfattning av er konversation ---",
            footer: "----------------------------------------",
        },
        Language::Arabic => SummaryTemplate {
            system: "لخّص المحادثة بإيجاز وبنبرة ودودة باللغة العربية. \
                     استخدم 3–5 نقاط واختم بسؤال قصير ودود.",
            header: "--- ملخص المحادثة ---",
            footer: "----------------------",
        },
        Language::English => SummaryTemplate {
            system: "Summarize the conversation briefly in a warm tone. \
                     Use 3–5 bullets and end with a short friendly question.",
            header: "--- Conversation Summary ---",
            footer: "----------------------------",
        },
    }
}

pub fn fallback_message(lang: Language) -> &'static str {
    match lang {
        Language::Swedish => "Oj, något gick fel när jag kontaktade modellen. Kan du prova igen?",
        Language::Arabic => "عذرًا، حدث خطأ أثناء الاتصال بالنموذج. هل يمكنك المحاولة مجددًا؟",
        Language::English => "Oops, something went wrong contacting the model. Please try again.",
    }
}

pub fn summary_failed_message(lang: Language) -> &'static str {
    match lang {
        Language::Swedish => "Kunde inte skapa en sammanfattning just nu. Försök gärna igen strax.",
        Language::Arabic => "تعذَّر إنشاء الملخص الآن. من فضلك حاول مجددًا بعد قليل.",
        Language::English => "Couldn't generate the summary right now. Please try again shortly.",
    }
}
