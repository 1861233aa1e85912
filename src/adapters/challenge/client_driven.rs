use async_trait::async_trait;

use crate::ports::{ChallengeError, ChallengeRequest, ThreeDsChallenge};

/// Challenge run entirely by the browser widget.
///
/// The pay endpoint returns the [`ChallengeRequest`] to the page, which
/// starts the widget and later reports completion or failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientDrivenChallenge;

#[async_trait]
impl ThreeDsChallenge for ClientDrivenChallenge {
    fn is_ready(&self) -> bool {
        true
    }

    async fn start(&self, request: &ChallengeRequest) -> Result<(), ChallengeError> {
        tracing::debug!(currency = %request.currency, "3DS challenge handed to client widget");
        Ok(())
    }
}
