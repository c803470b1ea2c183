//! Fixed prompt templates for the chat and report routes.

use crate::profiles::{render_labels, ProfileTable};

const REPORT_OUTLINE: &str = "\
보고서는 다음과 같은 형식으로 작성해 주세요:

1. **개요**: 고객의 상황과 보고서의 목적을 설명합니다.
2. **자산 분포 분석**: 주어진 데이터를 통해 고객의 자산 규모와 자산 종류별 분포를 분석합니다. 관련 수치를 반영하여 고객의 자산 현황을 설명합니다.
3. **투자 등급 분석**: 데이터를 기반으로 고객의 투자 성향(공격적, 안정적 등)을 분석하여 설명합니다.
4. **주식 거래 유형 분석**: 주식 거래 데이터를 바탕으로 고객의 주식 거래 방식(단타, 우량주 투자 등)을 분석합니다.
5. **맞춤형 투자 전략 제안**: 데이터를 기반으로 고객의 상황에 맞는 맞춤형 투자 전략을 제안합니다. 안정적이고 장기적인 투자 방안을 포함해주세요.
6. **결론**: 보고서의 핵심 내용을 요약하고 고객이 앞으로 나아가야 할 방향을 제안합니다.

보고서는 한글로 작성해야 하며 보고서 내의 내용만 알려줘.";

/// Question-answering prompt grounded in retrieved report lines.
///
/// `relevant_info` is the newline-joined search result (or the no-match
/// sentinel).
pub fn chat_prompt(relevant_info: &str, prompt: &str, prev_chat: &str) -> String {
    format!(
        "문서에서 찾은 정보:\n{}\n\n\
         질문: {}\n\n\
         이전 대화: {}\n\n\
         위 정보를 바탕으로 질문에 대한 답변을 3~5문장 이내로 작성해주세요.",
        relevant_info, prompt, prev_chat
    )
}

/// Report-writing prompt: raw tables, label map, customer info, outline.
pub fn report_prompt(tables: &[ProfileTable], info: &str) -> String {
    let mut out = String::new();
    for table in tables {
        out.push_str(&format!("[{}]\n{}\n\n", table.name(), table.text));
    }
    out.push_str("[항목 코드]\n");
    out.push_str(&render_labels());
    out.push_str("\n\n");
    out.push_str(&format!(
        "주어진 데이터를 기반으로 고객에게 맞춤형 투자 보고서를 작성해 주세요. {} \
         각 항목에 대해 데이터를 분석하여 고객의 투자 성향과 자산 분포를 설명하고, \
         데이터를 바탕으로 맞춤형 투자 전략을 제안해 주세요.\n\n",
        info.trim()
    ));
    out.push_str(REPORT_OUTLINE);
    out
}
