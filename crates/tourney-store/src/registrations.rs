//! Team registrations.
//!
//! Unlike tournaments, registrations aren't mirrored locally: a team
//! registers once, and an organizer looks at one tournament's list at a
//! time. So this is a thin client, not a [`ResourceStore`](crate::ResourceStore).

use tourney_protocol::{Codec, JsonCodec, Registration};
use tourney_session::TokenSource;
use tourney_transport::{ApiRequest, HttpTransport};

use crate::store::{authorized, expect_success};
use crate::StoreError;

const REGISTRATIONS_PATH: &str = "/api/registrations";

/// Registers teams and lists a tournament's registrations.
pub struct RegistrationClient<T: HttpTransport, S: TokenSource> {
    transport: T,
    tokens: S,
    codec: JsonCodec,
}

impl<T: HttpTransport, S: TokenSource> RegistrationClient<T, S> {
    pub fn new(transport: T, tokens: S) -> Self {
        Self {
            transport,
            tokens,
            codec: JsonCodec,
        }
    }

    /// Registers a team for a tournament.
    ///
    /// Open to anyone; a bearer token is attached when there is one. The
    /// server fills in `id` and `registration_date`, and rejects the
    /// request when the tournament is full or its deadline has passed.
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<Registration, StoreError> {
        let mut request =
            ApiRequest::post(REGISTRATIONS_PATH).json(self.codec.encode(registration)?);
        if let Some(token) = self.tokens.bearer_token() {
            request = request.bearer(token);
        }

        let response = expect_success(self.transport.send(request).await?, || {
            "Failed to register team".to_string()
        })
        .inspect_err(|e| {
            tracing::warn!(
                tournament_id = %registration.tournament_id,
                team = %registration.team_name,
                error = %e,
                "registration rejected"
            );
        })?;
        let created: Registration = self.codec.decode(&response.body)?;

        tracing::info!(
            tournament_id = %created.tournament_id,
            team = %created.team_name,
            "team registered"
        );
        Ok(created)
    }

    /// Lists every registration for one tournament. Requires a token.
    pub async fn list_for_tournament(
        &self,
        tournament_id: &str,
    ) -> Result<Vec<Registration>, StoreError> {
        let token = authorized(&self.tokens)?;
        let request =
            ApiRequest::get(format!("{REGISTRATIONS_PATH}/{tournament_id}")).bearer(token);

        let response = expect_success(self.transport.send(request).await?, || {
            "Failed to fetch registrations".to_string()
        })?;
        Ok(self.codec.decode(&response.body)?)
    }
}
