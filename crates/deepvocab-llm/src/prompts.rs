//! System prompts keyed by part of speech.

use deepvocab_core::{ExplainRequest, QueryMode};
use strum::EnumString;

/// Which prompt family a request uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PromptKind {
    #[default]
    #[strum(serialize = "verb", serialize = "noun_verb", serialize = "verb_noun")]
    Verb,
    Noun,
    #[strum(serialize = "adj_adv", serialize = "adj", serialize = "adv")]
    AdjAdv,
    Prep,
    #[strum(serialize = "prep_conj", serialize = "conj")]
    PrepConj,
    /// Abstract concepts and anything without a clearer class.
    #[strum(serialize = "other", serialize = "concept")]
    Concept,
    /// Several words compared side by side.
    #[strum(disabled)]
    Comparison,
}

impl PromptKind {
    /// Prompt family for a request; unknown parts of speech use the verb prompt.
    pub fn for_request(request: &ExplainRequest) -> Self {
        if request.mode == QueryMode::List {
            return PromptKind::Comparison;
        }
        request
            .part_of_speech
            .as_deref()
            .and_then(|pos| pos.trim().parse().ok())
            .unwrap_or_default()
    }

    pub fn system_prompt(&self) -> &'static str {
        match self {
            PromptKind::Verb => VERB_PROMPT,
            PromptKind::Noun => NOUN_PROMPT,
            PromptKind::AdjAdv => ADJ_ADV_PROMPT,
            PromptKind::Prep => PREP_PROMPT,
            PromptKind::PrepConj => PREP_CONJ_PROMPT,
            PromptKind::Concept => CONCEPT_PROMPT,
            PromptKind::Comparison => COMPARISON_PROMPT,
        }
    }
}

/// User message for a request.
pub fn user_prompt(request: &ExplainRequest) -> String {
    match request.mode {
        QueryMode::Single => request.joined_words(),
        QueryMode::List => format!("请对比以下单词: {}", request.joined_words()),
    }
}

const SHARED_RULES: &str = "\
输出使用 Markdown，标题为 `### 单词`。\
面向准备英语考试的中文学习者，讲解用中文，例句用英文并附中文翻译。\
不要输出与单词无关的寒暄。";

const VERB_PROMPT: &str = "\
你是一位运用认知语言学讲解英语动词的老师。\
从核心意象（image schema）出发，说明这个动词的原型意义，\
再按意义引申的路径列出常见义项，每个义项给出一个例句，\
最后列出高频搭配与易混词。";

const NOUN_PROMPT: &str = "\
你是一位讲解英语名词的老师。\
先说明这个名词指称的核心概念和可数性，\
再列出主要义项与典型搭配（动词 + 名词、形容词 + 名词），每个义项给出一个例句。";

const ADJ_ADV_PROMPT: &str = "\
你是一位讲解英语形容词和副词的老师。\
说明核心含义与感情色彩，给出常见修饰对象、比较级用法和近义词辨析，每个义项给出一个例句。";

const PREP_PROMPT: &str = "\
你是一位运用空间隐喻讲解英语介词的老师。\
先用空间关系描述介词的核心图式，再说明它如何引申到时间和抽象关系，每种用法给出一个例句。";

const PREP_CONJ_PROMPT: &str = "\
你是一位讲解英语介词和连词的老师。\
区分这个词作介词和作连词时的用法与逻辑关系，给出对应例句，并指出常见误用。";

const CONCEPT_PROMPT: &str = "\
你是一位讲解英语抽象概念词的老师。\
用通俗的中文解释概念本身，给出词源或构词线索，常见语境和例句。";

const COMPARISON_PROMPT: &str = "\
你是一位辨析英语近义词的老师。\
对用户给出的一组单词，先用一句话概括共同点，再用表格对比核心含义、语气、典型搭配，\
最后为每个词给出一个体现差异的例句。";

/// Full system prompt for a request.
pub fn system_prompt(request: &ExplainRequest) -> String {
    format!(
        "{}\n\n{}",
        PromptKind::for_request(request).system_prompt(),
        SHARED_RULES
    )
}
