//! Prompt construction for the LLM call.
//!
//! The whole knowledge base is serialized into a numbered list and sent with
//! every request, together with the closest match. Output is deterministic for
//! a given knowledge base.

use crate::knowledge::KnowledgeBase;
use crate::matcher::MatchResult;

/// Policy instructions sent as the system message.
pub const SYSTEM_PROMPT: &str = "
أنت مساعد افتراضي ذكي لخدمة العملاء في مجال التأمين الطبي ضمن نظام HELLO ServAI.

القواعد الأساسية لعملك:

1. مصدر المعرفة الوحيد لديك هو \"قاعدة المعرفة\" التي سيتم تزويدك بها (أسئلة وأجوبة محددة).
2. يجب أن تعتمد إجابتك فقط على المعلومات الموجودة في هذه القاعدة.
3. إذا لم تجد في القاعدة معلومات كافية للإجابة بدقة:
   - لا تخترع إجابات أو سياسات من عندك (لا للهلوسة).
   - استخدم أسلوب مهذب ولبق واطلب من العميل التواصل مع موظف خدمة العملاء البشري.
4. إذا كان السؤال يتضمن معلومات شخصية أو طلبًا للوصول إلى بيانات حساسة (مثل: مطالبة محددة، رقم هوية، تفاصيل حالة طبية شخصية، حالة ملف معيّن):
   - لا تحاول تخمين أو تأكيد أي معلومات.
   - اشرح للعميل بلطف أن هذه الحالات تحتاج لموظف خدمة العملاء حفاظًا على الخصوصية.
5. أجب دائمًا باللغة العربية الفصحى المبسّطة، وبأسلوب خدمة عملاء راقٍ وودود.
6. إذا كان السؤال خارج نطاق التأمين الطبي أو الخدمات المذكورة في قاعدة المعرفة:
   - أوضِح أن السؤال خارج نطاق هذه النسخة التجريبية من النظام،
   - واقترح عليه التواصل مع مركز خدمة العملاء في شركته للحصول على تفاصيل أدق.

صيغة الإجابة:
- اجعل الجواب قصيرًا وواضحًا، ويمكنك تقسيمه إلى نقاط عند الحاجة.
- إن احتجت تحويله لموظف خدمة العملاء، وضّح ذلك في نهاية الرد بنبرة ودية.
";

/// Stands in for the matched question when nothing matched.
pub const NO_MATCH_QUESTION: &str = "لا يوجد تطابق واضح.";
/// Stands in for the matched answer when nothing matched.
pub const NO_MATCH_ANSWER: &str = "لا يوجد جواب مطابق في قاعدة المعرفة.";

/// Serializes the knowledge base as a numbered question/answer list.
///
/// Entries with a blank question or answer are left out but keep their
/// position in the numbering.
pub fn build_context(kb: &KnowledgeBase) -> String {
    kb.entries()
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let q = entry.question.trim();
            let a = entry.answer.trim();
            if q.is_empty() || a.is_empty() {
                return None;
            }
            Some(format!("{}. سؤال: {}\n   جواب: {}", idx + 1, q, a))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the user-role message: the customer's question, the closest match
/// and the full knowledge-base context.
pub fn build_user_message(user_question: &str, best: &MatchResult, context: &str) -> String {
    let best_q = if best.question.is_empty() {
        NO_MATCH_QUESTION
    } else {
        best.question.as_str()
    };
    let best_a = if best.answer.is_empty() {
        NO_MATCH_ANSWER
    } else {
        best.answer.as_str()
    };

    format!(
        "
سؤال العميل:
{user_question}

أقرب سؤال مطابق في قاعدة المعرفة (إن وجد):
سؤال: {best_q}
جواب: {best_a}

نص قاعدة المعرفة (أسئلة وأجوبة متاحة لديك فقط):

{context}
"
    )
}
