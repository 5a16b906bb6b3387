//! Recommendation orchestrator.
//!
//! Turns a free-text user message and the cached catalog into a reply
//! string, a bounded list of recommended products, and an order-buttons
//! flag. The actual text generation is an opaque capability behind
//! [`ReplyGenerator`] so tests can inject a stub and the transport stays
//! swappable.

use std::collections::HashMap;

use serde::Serialize;

use bazaar_core::Product;

use super::assistant::AssistantError;

/// Maximum number of products surfaced to the user per chat turn.
pub const MAX_RECOMMENDED: usize = 5;

/// Reply used when the catalog snapshot has not been ingested yet.
pub const CATALOG_NOT_READY_REPLY: &str =
    "Sorry, the product catalog has not loaded yet. Please try again later.";

/// Reply for generation calls that exceeded the time budget.
pub const TIMEOUT_REPLY: &str =
    "Sorry, the reply is taking too long. Try a shorter question or come back later.";

/// Reply for credential or service problems at the generation provider.
pub const SERVICE_UNAVAILABLE_REPLY: &str =
    "Sorry, the service is having temporary problems. Please try again later.";

/// Reply for any other generation failure.
pub const GENERIC_FAILURE_REPLY: &str =
    "Sorry, something went wrong while generating a reply. Try again later or rephrase your question.";

/// Raw output of the generation capability, before shaping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedReply {
    /// Natural-language reply text.
    pub reply: String,
    /// Identifiers of products the generator referenced.
    pub product_ids: Vec<String>,
    /// Whether the front end should show "order" action buttons.
    pub order_buttons_mode: bool,
}

/// Capability to produce a reply plus product references for a message.
pub trait ReplyGenerator {
    /// Generate a reply for `message` given the current catalog.
    fn generate(
        &self,
        message: &str,
        catalog: &[Product],
    ) -> impl Future<Output = Result<GeneratedReply, AssistantError>> + Send;
}

/// A product projected to its public view for transport.
///
/// Internal-only fields from the upstream feed never leak through this.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendedProduct {
    pub id: String,
    pub name: String,
    pub price: String,
    pub description: String,
    pub pictures: Vec<String>,
}

impl From<&Product> for RecommendedProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.key(),
            name: product.name.clone(),
            price: product.price.clone(),
            description: product.description.clone(),
            pictures: product.pictures.clone(),
        }
    }
}

/// One completed chat turn, shaped for the response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub reply: String,
    pub recommended_products: Vec<RecommendedProduct>,
    pub product_ids: Vec<String>,
    pub order_buttons_mode: bool,
}

impl ChatTurn {
    fn text_only(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            recommended_products: Vec::new(),
            product_ids: Vec::new(),
            order_buttons_mode: false,
        }
    }
}

/// Generation failed; carries only the user-facing message.
///
/// The raw upstream error is logged where the failure is caught and never
/// travels further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub message: &'static str,
}

/// Recommendation orchestrator over a [`ReplyGenerator`].
#[derive(Clone)]
pub struct Recommender<G> {
    generator: G,
}

impl<G: ReplyGenerator + Send + Sync> Recommender<G> {
    /// Create a new orchestrator.
    pub const fn new(generator: G) -> Self {
        Self { generator }
    }

    /// Produce a chat turn for `message` against `catalog`.
    ///
    /// An empty catalog short-circuits to a fixed "not ready" reply without
    /// any outbound call.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationFailure`] with a user-facing message when the
    /// generation call fails; the technical error is logged here.
    pub async fn generate(
        &self,
        message: &str,
        catalog: &[Product],
    ) -> Result<ChatTurn, GenerationFailure> {
        if catalog.is_empty() {
            tracing::warn!("chat requested before catalog ingestion");
            return Ok(ChatTurn::text_only(CATALOG_NOT_READY_REPLY));
        }

        let generated = match self.generator.generate(message, catalog).await {
            Ok(generated) => generated,
            Err(error) => {
                let message = classify_failure(&error);
                tracing::error!(error = %error, "reply generation failed");
                return Err(GenerationFailure { message });
            }
        };

        Ok(shape(generated, catalog))
    }
}

/// Map a generation error to one of the three user-facing messages.
///
/// Typed timeouts map directly; everything else is classified by inspecting
/// the error text case-insensitively, since upstream failures arrive as
/// opaque strings from several transport layers.
fn classify_failure(error: &AssistantError) -> &'static str {
    if matches!(error, AssistantError::Timeout) {
        return TIMEOUT_REPLY;
    }

    let text = error.to_string().to_lowercase();
    if text.contains("timeout") || text.contains("timed out") {
        TIMEOUT_REPLY
    } else if text.contains("api") || text.contains("key") {
        SERVICE_UNAVAILABLE_REPLY
    } else {
        GENERIC_FAILURE_REPLY
    }
}

/// Bound and project the generator output for transport.
fn shape(generated: GeneratedReply, catalog: &[Product]) -> ChatTurn {
    let by_key: HashMap<String, &Product> =
        catalog.iter().map(|p| (p.key(), p)).collect();

    let recommended_products = generated
        .product_ids
        .iter()
        .filter_map(|id| by_key.get(id.as_str()).copied())
        .take(MAX_RECOMMENDED)
        .map(RecommendedProduct::from)
        .collect();

    ChatTurn {
        reply: generated.reply,
        recommended_products,
        product_ids: generated.product_ids,
        order_buttons_mode: generated.order_buttons_mode,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Stub generator that records invocations and returns a canned result.
    struct StubGenerator {
        calls: AtomicUsize,
        result: Result<GeneratedReply, fn() -> AssistantError>,
    }

    impl StubGenerator {
        fn ok(reply: GeneratedReply) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Ok(reply),
            }
        }

        fn err(make: fn() -> AssistantError) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                result: Err(make),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ReplyGenerator for StubGenerator {
        async fn generate(
            &self,
            _message: &str,
            _catalog: &[Product],
        ) -> Result<GeneratedReply, AssistantError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(reply) => Ok(reply.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn product(id: &str, name: &str) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": name,
            "price": "100",
            "description": "d",
            "pictures": [],
            "internal_sku": "do-not-leak"
        }))
        .expect("product")
    }

    fn catalog(n: usize) -> Vec<Product> {
        (0..n)
            .map(|i| product(&format!("p{i}"), &format!("Product {i}")))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_catalog_short_circuits_without_calls() {
        let stub = StubGenerator::ok(GeneratedReply::default());
        let recommender = Recommender::new(stub);

        let turn = recommender.generate("hi", &[]).await.expect("turn");

        assert_eq!(turn.reply, CATALOG_NOT_READY_REPLY);
        assert!(turn.recommended_products.is_empty());
        assert!(turn.product_ids.is_empty());
        assert!(!turn.order_buttons_mode);
        assert_eq!(recommender.generator.call_count(), 0);
    }

    #[tokio::test]
    async fn test_recommendations_bounded_to_five() {
        let catalog = catalog(10);
        let stub = StubGenerator::ok(GeneratedReply {
            reply: "Here you go".to_string(),
            product_ids: (0..10).map(|i| format!("p{i}")).collect(),
            order_buttons_mode: true,
        });
        let recommender = Recommender::new(stub);

        let turn = recommender.generate("what do you have?", &catalog).await.expect("turn");

        assert_eq!(turn.recommended_products.len(), MAX_RECOMMENDED);
        assert_eq!(turn.product_ids.len(), 10);
        assert!(turn.order_buttons_mode);
        assert_eq!(recommender.generator.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_skipped_not_padded() {
        let catalog = catalog(2);
        let stub = StubGenerator::ok(GeneratedReply {
            reply: "r".to_string(),
            product_ids: vec!["nope".to_string(), "p1".to_string()],
            order_buttons_mode: false,
        });
        let recommender = Recommender::new(stub);

        let turn = recommender.generate("m", &catalog).await.expect("turn");

        assert_eq!(turn.recommended_products.len(), 1);
        assert_eq!(turn.recommended_products[0].id, "p1");
    }

    #[tokio::test]
    async fn test_projection_has_public_fields_only() {
        let catalog = vec![product("p0", "Tea")];
        let stub = StubGenerator::ok(GeneratedReply {
            reply: "r".to_string(),
            product_ids: vec!["p0".to_string()],
            order_buttons_mode: false,
        });
        let recommender = Recommender::new(stub);

        let turn = recommender.generate("m", &catalog).await.expect("turn");
        let json = serde_json::to_value(&turn.recommended_products).expect("json");

        assert_eq!(
            json,
            serde_json::json!([{
                "id": "p0",
                "name": "Tea",
                "price": "100",
                "description": "d",
                "pictures": []
            }])
        );
    }

    #[tokio::test]
    async fn test_timeout_error_maps_to_timeout_message() {
        let catalog = catalog(1);
        let stub = StubGenerator::err(|| AssistantError::Timeout);
        let recommender = Recommender::new(stub);

        let failure = recommender.generate("m", &catalog).await.expect_err("failure");
        assert_eq!(failure.message, TIMEOUT_REPLY);
    }

    #[tokio::test]
    async fn test_timeout_substring_maps_to_timeout_message() {
        let catalog = catalog(1);
        let stub = StubGenerator::err(|| {
            AssistantError::Parse("upstream said: Connection Timed Out".to_string())
        });
        let recommender = Recommender::new(stub);

        let failure = recommender.generate("m", &catalog).await.expect_err("failure");
        assert_eq!(failure.message, TIMEOUT_REPLY);
        // The raw error text never reaches the user-facing message.
        assert!(!failure.message.to_lowercase().contains("connection"));
    }

    #[tokio::test]
    async fn test_api_error_maps_to_service_message() {
        let catalog = catalog(1);
        let stub = StubGenerator::err(|| AssistantError::Api {
            error_type: "invalid_request_error".to_string(),
            message: "bad request".to_string(),
        });
        let recommender = Recommender::new(stub);

        let failure = recommender.generate("m", &catalog).await.expect_err("failure");
        assert_eq!(failure.message, SERVICE_UNAVAILABLE_REPLY);
    }

    #[tokio::test]
    async fn test_other_error_maps_to_generic_message() {
        let catalog = catalog(1);
        let stub = StubGenerator::err(|| AssistantError::Parse("garbled".to_string()));
        let recommender = Recommender::new(stub);

        let failure = recommender.generate("m", &catalog).await.expect_err("failure");
        assert_eq!(failure.message, GENERIC_FAILURE_REPLY);
    }
}
