use async_trait::async_trait;
use serde::Deserialize;
use smartsales_application::{PaymentGateway, PaymentIntent};
use smartsales_core::{AppError, AppResult};
use tracing::info;

const STRIPE_PAYMENT_INTENTS_URL: &str = "https://api.stripe.com/v1/payment_intents";

/// Payment gateway backed by the Stripe payment-intents API.
pub struct StripePaymentGateway {
    http_client: reqwest::Client,
    secret_key: String,
    endpoint: String,
}

impl StripePaymentGateway {
    /// Creates a gateway authenticated with the given secret key.
    #[must_use]
    pub fn new(http_client: reqwest::Client, secret_key: String) -> Self {
        Self {
            http_client,
            secret_key,
            endpoint: STRIPE_PAYMENT_INTENTS_URL.to_owned(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PaymentIntentResponse {
    id: String,
    client_secret: String,
}

pub(crate) fn payment_intent_form(amount_cents: i64, currency: &str) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .append_pair("amount", &amount_cents.to_string())
        .append_pair("currency", currency)
        .append_pair("payment_method_types[]", "card")
        .finish()
}

#[async_trait]
impl PaymentGateway for StripePaymentGateway {
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> AppResult<PaymentIntent> {
        let response = self
            .http_client
            .post(self.endpoint.as_str())
            .bearer_auth(self.secret_key.as_str())
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(payment_intent_form(amount_cents, currency))
            .send()
            .await
            .map_err(|error| AppError::Internal(format!("payment provider transport error: {error}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "payment provider rejected the intent with status {status}: {body}"
            )));
        }

        let intent = response
            .json::<PaymentIntentResponse>()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to decode payment intent: {error}"))
            })?;

        info!(intent_id = %intent.id, amount_cents, "payment intent created");
        Ok(PaymentIntent {
            id: intent.id,
            client_secret: intent.client_secret,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::payment_intent_form;

    #[test]
    fn form_body_requests_card_payments_in_cents() {
        assert_eq!(
            payment_intent_form(12_550, "usd"),
            "amount=12550&currency=usd&payment_method_types%5B%5D=card"
        );
    }
}
