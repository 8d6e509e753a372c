use std::collections::HashSet;

use lazy_static::lazy_static;

/// Characters whose traditional and simplified forms differ, as
/// `(traditional, simplified)` pairs.
pub const VARIANT_PAIRS: &[(char, char)] = &[
    ('國', '国'), ('學', '学'), ('術', '术'), ('體', '体'), ('醫', '医'),
    ('門', '门'), ('風', '风'), ('畫', '画'), ('廣', '广'), ('臺', '台'),
    ('萬', '万'), ('與', '与'), ('車', '车'), ('馬', '马'), ('豐', '丰'),
    ('後', '后'), ('發', '发'), ('華', '华'), ('裡', '里'), ('際', '际'),
    ('雲', '云'), ('點', '点'), ('歡', '欢'), ('樂', '乐'), ('羅', '罗'),
    ('齊', '齐'), ('氣', '气'), ('灣', '湾'), ('書', '书'), ('劃', '划'),
    ('聽', '听'), ('說', '说'), ('讀', '读'), ('寫', '写'), ('訊', '讯'),
    ('號', '号'), ('價', '价'), ('區', '区'), ('龜', '龟'), ('實', '实'),
    ('藝', '艺'), ('壓', '压'), ('這', '这'), ('針', '针'), ('達', '达'),
    ('將', '将'), ('圖', '图'), ('當', '当'), ('過', '过'), ('還', '还'),
    ('讓', '让'), ('輸', '输'), ('園', '园'), ('圓', '圆'), ('魚', '鱼'),
    ('鳥', '鸟'), ('龍', '龙'), ('燈', '灯'), ('麵', '面'), ('餘', '余'),
    ('適', '适'), ('幫', '帮'), ('經', '经'), ('邊', '边'), ('蘇', '苏'),
    ('圍', '围'), ('鐵', '铁'), ('觀', '观'), ('鐘', '钟'), ('銀', '银'),
    ('雜', '杂'), ('難', '难'), ('電', '电'), ('歲', '岁'), ('麗', '丽'),
    ('戶', '户'), ('陽', '阳'), ('師', '师'), ('憶', '忆'), ('榮', '荣'),
    ('壯', '壮'), ('陰', '阴'), ('聲', '声'), ('徑', '径'), ('傷', '伤'),
    ('習', '习'), ('歸', '归'), ('顧', '顾'), ('夢', '梦'), ('續', '续'),
    ('絕', '绝'), ('雙', '双'), ('戀', '恋'), ('監', '监'), ('幣', '币'),
    ('顯', '显'), ('檔', '档'), ('環', '环'), ('隱', '隐'), ('縣', '县'),
    ('劍', '剑'), ('劑', '剂'), ('劉', '刘'), ('屬', '属'), ('儀', '仪'),
    ('隨', '随'),
];

lazy_static! {
    static ref TRADITIONAL: HashSet<char> = VARIANT_PAIRS.iter().map(|&(t, _)| t).collect();
    static ref SIMPLIFIED: HashSet<char> = VARIANT_PAIRS.iter().map(|&(_, s)| s).collect();
}

/// Pick `zh-TW` or `zh-CN` for a Han-script sample.
///
/// Counts traditional-only and simplified-only characters in the first
/// `sample_chars` characters. With no signal either way, a `zh-TW` or
/// `zh-HK` host locale selects `zh-TW`.
pub fn detect_chinese_variant(text: &str, sample_chars: usize, host_locale: &str) -> &'static str {
    let mut traditional = 0usize;
    let mut simplified = 0usize;

    for ch in text.chars().take(sample_chars) {
        if TRADITIONAL.contains(&ch) {
            traditional += 1;
        }
        if SIMPLIFIED.contains(&ch) {
            simplified += 1;
        }
    }

    if traditional == 0 && simplified == 0 {
        let locale = host_locale.to_lowercase();
        if locale.starts_with("zh-tw") || locale.starts_with("zh-hk") {
            return "zh-TW";
        }
        return "zh-CN";
    }

    if traditional > simplified {
        "zh-TW"
    } else {
        "zh-CN"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traditional_characters_win() {
        assert_eq!(detect_chinese_variant("這是臺灣的學校", 4000, "en-US"), "zh-TW");
    }

    #[test]
    fn simplified_characters_win() {
        assert_eq!(detect_chinese_variant("这是中国的学校", 4000, "zh-TW"), "zh-CN");
    }

    #[test]
    fn tie_goes_to_simplified() {
        assert_eq!(detect_chinese_variant("國学", 4000, "en-US"), "zh-CN");
    }

    #[test]
    fn no_signal_consults_locale() {
        assert_eq!(detect_chinese_variant("你好", 4000, "zh-HK"), "zh-TW");
        assert_eq!(detect_chinese_variant("你好", 4000, "zh-tw"), "zh-TW");
        assert_eq!(detect_chinese_variant("你好", 4000, "en-US"), "zh-CN");
    }

    #[test]
    fn only_the_sample_window_counts() {
        let text = format!("{}{}", "你".repeat(10), "國國國");
        assert_eq!(detect_chinese_variant(&text, 10, "en-US"), "zh-CN");
        assert_eq!(detect_chinese_variant(&text, 13, "en-US"), "zh-TW");
    }

    #[test]
    fn pair_table_has_no_overlap() {
        assert!(TRADITIONAL.is_disjoint(&SIMPLIFIED));
        assert_eq!(TRADITIONAL.len(), VARIANT_PAIRS.len());
    }
}
