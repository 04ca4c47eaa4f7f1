#![allow(dead_code)]

use fakenews_etl::ParamsConfig;
use std::fs;
use std::path::{Path, PathBuf};

const TOPICS: [&str; 5] = ["economy", "election", "health", "border", "energy"];

/// 20 篇假新聞（其中 2 篇日期無法解析）與 20 篇真新聞
pub fn write_corpus(dir: &Path) -> (PathBuf, PathBuf) {
    let mut fake = String::from("title,text,subject,date\n");
    for i in 0..20 {
        let topic = TOPICS[i % TOPICS.len()];
        let date = if i >= 18 {
            "https://bit.ly/broken".to_string()
        } else {
            format!("December {}, 2017", i + 1)
        };
        fake.push_str(&format!(
            "\"SHOCKING secret about {topic}!\",\"Aliens hoax conspiracy revealed: the {topic} truth they hide <a href='x'>click</a> www.fake.example\",politics,\"{date}\"\n"
        ));
    }

    let mut real = String::from("title,text,subject,date\n");
    for i in 0..20 {
        let topic = TOPICS[i % TOPICS.len()];
        real.push_str(&format!(
            "\"Senate passes {topic} bill\",\"WASHINGTON (Reuters) - Lawmakers approved the {topic} budget reform on Tuesday, officials said.\",politicsNews,\"{:02}/11/2017\"\n",
            i + 1
        ));
    }

    let fake_path = dir.join("Fake.csv");
    let true_path = dir.join("True.csv");
    fs::write(&fake_path, fake).unwrap();
    fs::write(&true_path, real).unwrap();
    (fake_path, true_path)
}

pub fn params_for(corpus_dir: &Path, output_dir: &Path) -> ParamsConfig {
    let (fake_path, true_path) = write_corpus(corpus_dir);
    let content = format!(
        r#"
[paths]
fake_source = "{}"
true_source = "{}"
output_dir = "{}"

[dataingestion]
test_size = 0.2
random_state = 33

[preprocessing]
max_features = 500
min_df = 2

[modelbuilding]
random_state = 42
max_iter = 300
learning_rate = 0.1
"#,
        fake_path.display(),
        true_path.display(),
        output_dir.display()
    );
    ParamsConfig::from_toml_str(&content).unwrap()
}
