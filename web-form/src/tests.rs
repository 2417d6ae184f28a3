#[cfg(test)]
mod tests {
    use crate::view::{escape_html, render_page};
    use crate::{generate_output, router, FormState, EMPTY_PROMPT_MESSAGE};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use caption_engine::PostPipeline;
    use instacaption_core::{
        Classification, ClassificationError, CoreError, GenerationParams, Profile,
        ProfileSettings,
    };
    use llm_interface::{SentimentClassifier, TextGenerator};
    use post_store::PostStore;
    use std::env;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct CannedGenerator;

    impl TextGenerator for CannedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, CoreError> {
            Ok(format!("{prompt} is the best way to start a slow sunday morning at home"))
        }
    }

    struct PositiveClassifier;

    impl SentimentClassifier for PositiveClassifier {
        async fn classify(&self, _text: &str) -> Result<Classification, CoreError> {
            Ok(Classification {
                label: "POSITIVE".to_string(),
                score: 0.97,
            })
        }
    }

    struct BrokenClassifier;

    impl SentimentClassifier for BrokenClassifier {
        async fn classify(&self, _text: &str) -> Result<Classification, CoreError> {
            Err(ClassificationError::NoLabels.into())
        }
    }

    fn test_state<C>(classifier: C) -> (Arc<FormState<CannedGenerator, C>>, PostStore)
    where
        C: SentimentClassifier,
    {
        let store = PostStore::new(
            env::temp_dir().join(format!("test_instacaption_web_{}", uuid::Uuid::new_v4())),
        );
        let pipeline = PostPipeline::new(
            CannedGenerator,
            classifier,
            store.clone(),
            ProfileSettings::for_profile(Profile::Web),
            GenerationParams::default(),
        );
        (Arc::new(FormState::new(pipeline)), store)
    }

    fn form_request(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"cats\" & 'dogs'</b>"),
            "&lt;b&gt;&quot;cats&quot; &amp; &#39;dogs&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_render_page_without_output() {
        let page = render_page("", None);
        assert!(page.contains("<form method=\"post\" action=\"/\">"));
        assert!(page.contains("name=\"prompt\""));
        assert!(!page.contains("<textarea"));
    }

    #[test]
    fn test_render_page_escapes_prompt() {
        let page = render_page("<script>", Some("out"));
        assert!(page.contains("value=\"&lt;script&gt;\""));
        assert!(page.contains(">out</textarea>"));
    }

    #[tokio::test]
    async fn test_get_renders_form() {
        let (state, _store) = test_state(PositiveClassifier);
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let response = router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains("Keyword or theme"));
    }

    #[tokio::test]
    async fn test_post_generates_and_saves() {
        let (state, store) = test_state(PositiveClassifier);

        let response = router(state)
            .oneshot(form_request("prompt=morning+coffee"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let page = body_text(response).await;
        // echo stripped, capped at eight words
        assert!(page.contains("Caption: is the best way to start a slow\nEmojis: "));
        assert!(page.contains("Hashtags: #"));
        assert!(page.contains("Saved to: "));
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 1);

        let _ = std::fs::remove_dir_all(store.dir());
    }

    #[tokio::test]
    async fn test_empty_prompt_is_rejected() {
        let (state, store) = test_state(PositiveClassifier);

        let response = router(state)
            .oneshot(form_request("prompt=+++"))
            .await
            .unwrap();
        let page = body_text(response).await;
        assert!(page.contains(EMPTY_PROMPT_MESSAGE));
        assert!(!store.dir().exists());
    }

    #[tokio::test]
    async fn test_failure_is_reported_in_output() {
        let (state, store) = test_state(BrokenClassifier);

        let output = generate_output(&state, "new pet").await;
        assert!(output.starts_with("❌ An error occurred:"));
        assert!(output.contains("Sentiment analysis failed"));
        assert!(!store.dir().exists());
    }
}
