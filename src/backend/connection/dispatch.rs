/**
 * Command Dispatch
 *
 * Turns one command (tag plus optional JSON payload) into exactly one result
 * frame. Nothing here can fail the connection: malformed payloads, invalid
 * fields and gateway errors all become failure frames.
 */

use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::backend::auth::validation::check_registration;
use crate::backend::auth::TokenIssuer;
use crate::backend::gateway::{GatewayError, SessionGateway};
use crate::backend::storage::StorageError;
use crate::shared::marketplace::NewListing;
use crate::shared::messaging::{next_cursor, validate_contents};
use crate::shared::protocol::{
    CommandTag, ListingQuery, LoginPayload, MessagePayload, MessagesQuery, PurchasePayload,
    RegistrationCode, RegistrationPayload, ServerFrame, INVALID_PAYLOAD, MALFORMED_PAYLOAD,
};

/// Executes commands for connections
#[derive(Debug, Clone)]
pub struct Dispatcher {
    gateway: SessionGateway,
    tokens: TokenIssuer,
}

fn decode<T: DeserializeOwned>(tag: CommandTag, payload: Option<&str>) -> Result<T, ServerFrame> {
    let Some(payload) = payload else {
        return Err(ServerFrame::failure(tag, MALFORMED_PAYLOAD));
    };
    serde_json::from_str(payload).map_err(|e| {
        debug!("[Conn] Malformed {} payload: {}", tag, e);
        ServerFrame::failure(tag, MALFORMED_PAYLOAD)
    })
}

fn gateway_failure(tag: CommandTag, err: GatewayError) -> ServerFrame {
    match &err {
        GatewayError::Storage(StorageError::Unknown { message }) => {
            error!("[Conn] {} failed in storage: {}", tag, message);
        }
        _ => debug!("[Conn] {} rejected: {}", tag, err),
    }
    ServerFrame::failure(tag, err.code())
}

fn registration_code(err: &GatewayError) -> RegistrationCode {
    match err {
        GatewayError::Storage(StorageError::EmailInUse) => RegistrationCode::EmailInUse,
        GatewayError::Storage(StorageError::UsernameInUse) => RegistrationCode::UsernameInUse,
        GatewayError::Binding(_) => RegistrationCode::AlreadyLoggedIn,
        _ => RegistrationCode::Unknown,
    }
}

impl Dispatcher {
    pub fn new(gateway: SessionGateway, tokens: TokenIssuer) -> Self {
        Self { gateway, tokens }
    }

    pub fn gateway(&self) -> &SessionGateway {
        &self.gateway
    }

    /// Issue a token, or none if signing fails
    fn token_for(&self, username: &str) -> Option<String> {
        match self.tokens.issue(username) {
            Ok(issued) => Some(issued.token),
            Err(e) => {
                error!("[Conn] Failed to sign token for {}: {}", username, e);
                None
            }
        }
    }

    /// Run `tag` for `connection_id` and build its result frame
    pub async fn dispatch(
        &self,
        connection_id: &str,
        tag: CommandTag,
        payload: Option<&str>,
    ) -> ServerFrame {
        let outcome = match tag {
            CommandTag::Login => self.login(connection_id, payload).await,
            CommandTag::Registration => self.register(connection_id, payload).await,
            CommandTag::Logout => Ok(self.logout(connection_id)),
            CommandTag::UploadMessage => self.upload_message(connection_id, payload).await,
            CommandTag::GetMessages => self.get_messages(connection_id, payload).await,
            CommandTag::UploadListing => self.upload_listing(connection_id, payload).await,
            CommandTag::BuyListing => self.buy_listing(connection_id, payload).await,
            CommandTag::GetListing => self.get_listing(connection_id, payload).await,
            CommandTag::GetContacts => Ok(self.get_contacts(connection_id).await),
        };
        outcome.unwrap_or_else(|failure| failure)
    }

    async fn login(&self, connection_id: &str, payload: Option<&str>) -> Result<ServerFrame, ServerFrame> {
        let tag = CommandTag::Login;
        let login: LoginPayload = decode(tag, payload)?;

        let username = self
            .gateway
            .login(connection_id, &login.email, &login.password)
            .await
            .map_err(|e| gateway_failure(tag, e))?;

        Ok(ServerFrame::LoginResult {
            result: true,
            token: self.token_for(&username),
            username: Some(username),
            error: None,
        })
    }

    async fn register(&self, connection_id: &str, payload: Option<&str>) -> Result<ServerFrame, ServerFrame> {
        let tag = CommandTag::Registration;
        let registration: RegistrationPayload = decode(tag, payload)?;
        let rejected = |code| ServerFrame::RegistrationResult {
            response_code: code,
            username: None,
            token: None,
        };

        if self.gateway.is_logged_in(connection_id) {
            warn!("[Conn] {} tried to register while logged in", connection_id);
            return Err(rejected(RegistrationCode::AlreadyLoggedIn));
        }
        if let Some(code) = check_registration(&registration) {
            return Err(rejected(code));
        }

        self.gateway
            .register(
                connection_id,
                &registration.username,
                &registration.email,
                &registration.password,
            )
            .await
            .map_err(|e| {
                debug!("[Conn] Registration rejected: {}", e);
                rejected(registration_code(&e))
            })?;

        Ok(ServerFrame::RegistrationResult {
            response_code: RegistrationCode::Success,
            token: self.token_for(&registration.username),
            username: Some(registration.username),
        })
    }

    fn logout(&self, connection_id: &str) -> ServerFrame {
        match self.gateway.logout(connection_id) {
            Ok(()) => ServerFrame::LogoutResult {
                result: true,
                error: None,
            },
            Err(e) => gateway_failure(CommandTag::Logout, e),
        }
    }

    async fn upload_message(&self, connection_id: &str, payload: Option<&str>) -> Result<ServerFrame, ServerFrame> {
        let tag = CommandTag::UploadMessage;
        let message: MessagePayload = decode(tag, payload)?;
        validate_contents(&message.message).map_err(|_| ServerFrame::failure(tag, INVALID_PAYLOAD))?;

        self.gateway
            .send_message(connection_id, &message.receiver, &message.message)
            .await
            .map_err(|e| gateway_failure(tag, e))?;

        Ok(ServerFrame::MessageUpload {
            result: true,
            error: None,
        })
    }

    async fn get_messages(&self, connection_id: &str, payload: Option<&str>) -> Result<ServerFrame, ServerFrame> {
        let tag = CommandTag::GetMessages;
        let query: MessagesQuery = decode(tag, payload)?;

        let messages = self
            .gateway
            .get_messages(connection_id, &query.counterpart, query.since)
            .await
            .map_err(|e| gateway_failure(tag, e))?;

        Ok(ServerFrame::MessagesResult {
            result: true,
            next_since: next_cursor(&messages),
            messages,
            error: None,
        })
    }

    async fn upload_listing(&self, connection_id: &str, payload: Option<&str>) -> Result<ServerFrame, ServerFrame> {
        let tag = CommandTag::UploadListing;
        let listing: NewListing = decode(tag, payload)?;
        listing
            .validate()
            .map_err(|_| ServerFrame::failure(tag, INVALID_PAYLOAD))?;

        let id = self
            .gateway
            .upload_listing(connection_id, listing)
            .await
            .map_err(|e| gateway_failure(tag, e))?;

        Ok(ServerFrame::ListingUpload {
            result: true,
            id: Some(id),
            error: None,
        })
    }

    async fn buy_listing(&self, connection_id: &str, payload: Option<&str>) -> Result<ServerFrame, ServerFrame> {
        let tag = CommandTag::BuyListing;
        let purchase: PurchasePayload = decode(tag, payload)?;

        self.gateway
            .buy_listing(connection_id, purchase.listing_id, purchase.amount)
            .await
            .map_err(|e| gateway_failure(tag, e))?;

        Ok(ServerFrame::PurchaseResult {
            result: true,
            error: None,
        })
    }

    async fn get_listing(&self, connection_id: &str, payload: Option<&str>) -> Result<ServerFrame, ServerFrame> {
        let tag = CommandTag::GetListing;
        let query: ListingQuery = decode(tag, payload)?;

        let listing = self
            .gateway
            .get_listing(connection_id, query.listing_id)
            .await
            .map_err(|e| gateway_failure(tag, e))?;

        Ok(ServerFrame::ListingResult {
            result: true,
            listing: Some(listing),
            error: None,
        })
    }

    async fn get_contacts(&self, connection_id: &str) -> ServerFrame {
        match self.gateway.get_contacts(connection_id).await {
            Ok(contacts) => ServerFrame::ContactsResult {
                result: true,
                contacts,
                error: None,
            },
            Err(e) => gateway_failure(CommandTag::GetContacts, e),
        }
    }
}
