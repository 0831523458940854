//! Per-family widget copy.
//!
//! Templates use a `{{name}}` placeholder for the record's display name.

use soico_records::RecordFamily;

/// Fixed text for one family's widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FamilyCopy {
    /// Extra wrapper class, empty for the base family
    pub modifier_class: &'static str,
    /// Conclusion box heading; markup, name inserted pre-escaped
    pub conclusion_title: &'static str,
    /// Conclusion box button fallback
    pub conclusion_button: &'static str,
    /// Small print under the conclusion button
    pub conclusion_note: &'static str,
    /// Inline CTA button fallback
    pub inline_button: &'static str,
    /// Single button fallback
    pub single_button: &'static str,
    /// Subtle banner message fallback
    pub banner_message: &'static str,
    /// Comparison table name column heading
    pub name_heading: &'static str,
    /// Comparison table action column heading
    pub action_heading: &'static str,
    /// Action text for the first-ranked row
    pub top_action: &'static str,
    /// Action text for every other row
    pub other_action: &'static str,
}

const SECURITIES: FamilyCopy = FamilyCopy {
    modifier_class: "",
    conclusion_title:
        "証券口座を開設するなら<span style=\"color: #E53935;\">{{name}}</span>がおすすめ",
    conclusion_button: "{{name}}で口座開設（無料）",
    conclusion_note: "※最短5分で申込完了 ※口座開設・維持費無料",
    inline_button: "詳細を見る →",
    single_button: "{{name}}の公式サイトを見る",
    banner_message: "💡 証券口座をお探しなら → {{name}}（国内株手数料0円）",
    name_heading: "証券会社",
    action_heading: "口座開設",
    top_action: "口座開設",
    other_action: "詳細を見る",
};

const CARD_LOAN: FamilyCopy = FamilyCopy {
    modifier_class: " soico-cta-cardloan",
    conclusion_title:
        "カードローンを選ぶなら<span style=\"color: #E53935;\">{{name}}</span>がおすすめ",
    conclusion_button: "{{name}}に申し込む",
    conclusion_note: "※審査結果によってはご希望に添えない場合があります",
    inline_button: "詳細を見る →",
    single_button: "{{name}}の公式サイトを見る",
    banner_message: "💡 お急ぎの方は → {{name}}（最短即日融資）",
    name_heading: "カードローン",
    action_heading: "申込",
    top_action: "申し込む",
    other_action: "詳細を見る",
};

/// Copy for `family`.
#[must_use]
pub fn copy_for(family: RecordFamily) -> &'static FamilyCopy {
    match family {
        RecordFamily::Securities => &SECURITIES,
        RecordFamily::CardLoan => &CARD_LOAN,
    }
}
