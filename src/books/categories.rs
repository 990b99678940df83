use std::collections::BTreeMap;

/// Fixed listing taxonomy: top-level category and its subcategories.
pub const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "哲學類",
        &["哲學總論", "思想；學術", "中國哲學", "東方哲學", "西洋哲學", "邏輯學", "形上學", "心理學", "美學", "倫理學"],
    ),
    (
        "宗教類",
        &["宗教總論", "宗教學", "佛教", "道教", "基督教", "伊斯蘭教", "猶太教", "其他宗教", "神話", "術數；迷信"],
    ),
    (
        "科學類",
        &["科學總論", "數學", "天文學", "物理學", "化學", "地球科學；地質學", "生物科學", "植物學", "動物學", "人類學"],
    ),
    (
        "應用科學類",
        &["應用科學總論", "醫藥", "家政", "農業", "工程", "礦冶", "化學工程", "製造", "商業：各種營業", "商業：經營學"],
    ),
    (
        "社會科學類",
        &["社會科學總論", "統計", "教育", "禮俗", "社會學", "經濟", "財政", "政治", "法律", "軍事"],
    ),
    ("史地類", &["史地總論"]),
    (
        "中國史地",
        &["中國通史", "中國斷代史", "中國文化史", "中國外交史", "中國史料", "中國地理", "中國地方志", "中國地理類志", "中國遊記"],
    ),
    (
        "世界史地",
        &["世界史地", "海洋志", "亞洲史地", "歐洲史地", "美洲史地", "非洲史地", "大洋洲史地", "傳記", "文物考古"],
    ),
    (
        "語言文學類",
        &["語言學總論", "文學總論", "中國文學", "中國文學總集", "中國文學別集", "中國各種文學", "東方文學", "西洋文學", "其他各國文學", "新聞學"],
    ),
    (
        "藝術類",
        &["藝術總論", "音樂", "建築藝術", "雕塑", "繪畫；書法", "攝影；電腦藝術", "應用美術", "技藝", "戲劇", "遊藝及休閒活動"],
    ),
    (
        "漫畫、輕小說類",
        &["異世界", "校園", "戀愛", "奇幻", "科幻", "神祕", "恐怖", "歷史", "推理", "熱血"],
    ),
    (
        "外文",
        &["英文", "西班牙語", "日語", "德語", "法語", "俄語", "葡萄牙語", "阿拉伯語", "韓語", "其他"],
    ),
];

/// Keyed map, serialized with keys in byte order.
pub fn taxonomy() -> BTreeMap<&'static str, &'static [&'static str]> {
    CATEGORIES.iter().copied().collect()
}
