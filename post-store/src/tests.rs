#[cfg(test)]
mod tests {
    use crate::PostStore;
    use chrono::{Local, TimeZone};
    use instacaption_core::{EmojiSet, HashtagSet, PostRecord, Prompt, SentimentLabel};
    use std::env;

    fn sample_record() -> PostRecord {
        PostRecord {
            prompt: Prompt::new("morning coffee").unwrap(),
            caption: "The best way to start the day.".to_string(),
            emojis: EmojiSet(vec!["😊", "🔥", "✨"]),
            hashtags: HashtagSet(vec!["#morning".to_string(), "#coffee".to_string()]),
            sentiment: Some(SentimentLabel::Positive),
            generated_at: Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap(),
        }
    }

    fn test_store() -> PostStore {
        let dir = env::temp_dir().join(format!("test_instacaption_{}", uuid::Uuid::new_v4()));
        PostStore::new(dir)
    }

    #[test]
    fn test_file_name() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(PostStore::file_name(&at), "instagram_post_20240309_070501.txt");
    }

    #[test]
    fn test_render_with_timestamp() {
        let text = PostStore::render(&sample_record(), true);
        let expected = "--- Instagram Post ---\n\
                        Prompt: morning coffee\n\
                        ------------------------------\n\
                        Caption: The best way to start the day.\n\
                        Emojis: 😊🔥✨\n\
                        Hashtags: #morning #coffee\n\
                        Generated at: 2024-03-09 07:05:01\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_without_timestamp() {
        let text = PostStore::render(&sample_record(), false);
        assert!(text.ends_with("Hashtags: #morning #coffee\n"));
        assert!(!text.contains("Generated at"));
    }

    #[tokio::test]
    async fn test_save_creates_directory() {
        let store = test_store();
        assert!(!store.dir().exists());

        let path = store
            .save(&sample_record(), true)
            .await
            .expect("Failed to save post");

        assert!(path.starts_with(store.dir()));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("Caption: The best way to start the day."));

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_same_second_overwrites() {
        let store = test_store();
        let first = sample_record();
        let mut second = sample_record();
        second.caption = "Second take.".to_string();

        let first_path = store.save(&first, false).await.unwrap();
        let second_path = store.save(&second, false).await.unwrap();
        assert_eq!(first_path, second_path);

        let written = std::fs::read_to_string(&second_path).unwrap();
        assert!(written.contains("Caption: Second take."));
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 1);

        let _ = std::fs::remove_dir_all(store.dir());
    }
}
