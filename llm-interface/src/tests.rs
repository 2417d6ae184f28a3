#[cfg(test)]
mod tests {
    use crate::hosted::{
        failure_for_status, model_endpoint, ClassificationResponse, Failure, GenerationParameters,
        GenerationRequest, RequestOptions,
    };
    use crate::{HostedClassifier, HostedGenerator};
    use instacaption_core::{
        ClassificationError, ConfigError, CoreError, GenerationParams, HostedConfig,
    };
    use reqwest::StatusCode;

    #[test]
    fn test_model_endpoint() {
        let url = model_endpoint("https://api-inference.huggingface.co", "gpt2").unwrap();
        assert_eq!(url.as_str(), "https://api-inference.huggingface.co/models/gpt2");

        let url = model_endpoint("http://localhost:8080/api", "org/sentiment").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/models/org/sentiment");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = model_endpoint("not a url", "gpt2");
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(failure_for_status(StatusCode::OK), None);
        assert_eq!(
            failure_for_status(StatusCode::UNAUTHORIZED),
            Some(Failure::Authentication)
        );
        assert_eq!(
            failure_for_status(StatusCode::TOO_MANY_REQUESTS),
            Some(Failure::RateLimited)
        );
        assert_eq!(
            failure_for_status(StatusCode::SERVICE_UNAVAILABLE),
            Some(Failure::Unavailable)
        );
        assert_eq!(
            failure_for_status(StatusCode::BAD_REQUEST),
            Some(Failure::Other(400))
        );
    }

    #[test]
    fn test_generation_request_body() {
        let params = GenerationParams {
            seed: Some(42),
            ..GenerationParams::default()
        };
        let body = GenerationRequest {
            inputs: "morning coffee",
            parameters: GenerationParameters::from(&params),
            options: RequestOptions {
                wait_for_model: true,
            },
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"], "morning coffee");
        assert_eq!(json["parameters"]["max_length"], 80);
        assert_eq!(json["parameters"]["no_repeat_ngram_size"], 2);
        assert_eq!(json["parameters"]["do_sample"], true);
        assert_eq!(json["parameters"]["seed"], 42);
        assert_eq!(json["parameters"]["return_full_text"], true);
        assert_eq!(json["options"]["wait_for_model"], true);
    }

    #[test]
    fn test_greedy_request_omits_sampling_fields() {
        let params = GenerationParams {
            temperature: None,
            top_p: None,
            ..GenerationParams::default()
        };
        let json = serde_json::to_value(GenerationParameters::from(&params)).unwrap();
        assert_eq!(json["do_sample"], false);
        assert!(json.get("temperature").is_none());
        assert!(json.get("top_p").is_none());
    }

    #[test]
    fn test_nested_classification_response() {
        let raw = r#"[[{"label":"NEGATIVE","score":0.02},{"label":"POSITIVE","score":0.98}]]"#;
        let response: ClassificationResponse = serde_json::from_str(raw).unwrap();
        let top = response.top().unwrap();
        assert_eq!(top.label, "POSITIVE");
        assert!((top.score - 0.98).abs() < f32::EPSILON);
    }

    #[test]
    fn test_flat_classification_response() {
        let raw = r#"[{"label":"neutral","score":0.6},{"label":"negative","score":0.4}]"#;
        let response: ClassificationResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.top().unwrap().label, "neutral");
    }

    #[test]
    fn test_empty_classification_response() {
        let response: ClassificationResponse = serde_json::from_str("[[]]").unwrap();
        assert!(matches!(response.top(), Err(ClassificationError::NoLabels)));
    }

    #[test]
    fn test_hosted_clients_from_config() {
        let config = HostedConfig {
            token_env: "INSTACAPTION_TEST_TOKEN_THAT_IS_NOT_SET".to_string(),
            ..HostedConfig::default()
        };

        let generator = HostedGenerator::from_config(&config).unwrap();
        assert_eq!(
            generator.endpoint().as_str(),
            "https://api-inference.huggingface.co/models/gpt2"
        );
        assert!(HostedClassifier::from_config(&config).is_ok());
    }
}
