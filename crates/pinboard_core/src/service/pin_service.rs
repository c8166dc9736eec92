//! Pin use-case service.
//!
//! # Responsibility
//! - Validate and normalize create/comment/like inputs.
//! - Translate repository outcomes into use-case errors (`NotFound`).
//!
//! # Invariants
//! - Validation runs before any statement reaches the store.
//! - The caller's client identifier is an explicit argument, never ambient.

use crate::model::pin::{
    ClientId, Comment, LikeState, NewComment, NewPin, Pin, PinDetail, PinId, PinValidationError,
    SortOrder,
};
use crate::repo::pin_repo::{PinListQuery, PinRepository, RepoError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for pin use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Missing or malformed required input.
    Validation(PinValidationError),
    /// Referenced pin does not exist.
    NotFound(PinId),
    /// Persistence-layer failure.
    Store(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(_) => write!(f, "Pin not found"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<PinValidationError> for ServiceError {
    fn from(value: PinValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(pin_id) => Self::NotFound(pin_id),
            other => Self::Store(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Pin service facade over repository implementations.
pub struct PinService<R: PinRepository> {
    repo: R,
}

impl<R: PinRepository> PinService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists pins, optionally filtered by a case-insensitive search text.
    pub fn list_pins(
        &mut self,
        search: Option<String>,
        sort: SortOrder,
    ) -> ServiceResult<Vec<Pin>> {
        let query = PinListQuery {
            search: search.filter(|text| !text.trim().is_empty()),
            sort,
        };
        Ok(self.repo.list_pins(&query)?)
    }

    /// Gets one pin with its comments, oldest comment first.
    pub fn get_pin(&mut self, id: PinId) -> ServiceResult<PinDetail> {
        self.repo
            .get_pin_detail(id)?
            .ok_or(ServiceError::NotFound(id))
    }

    /// Creates a pin with `likes_count = 0`.
    pub fn create_pin(
        &mut self,
        title: Option<&str>,
        description: Option<&str>,
        content: Option<&str>,
    ) -> ServiceResult<Pin> {
        let new_pin = NewPin::new(title, description, content)?;
        let pin = self.repo.create_pin(&new_pin)?;
        info!(
            "event=pin_create module=service status=ok pin_id={} content_chars={}",
            pin.id,
            pin.content.chars().count()
        );
        Ok(pin)
    }

    /// Adds a comment; the username defaults to `Anonymous`.
    pub fn add_comment(
        &mut self,
        pin_id: Option<PinId>,
        username: Option<&str>,
        content: Option<&str>,
    ) -> ServiceResult<Comment> {
        let new_comment = NewComment::new(pin_id, username, content)?;
        let comment = self.repo.create_comment(&new_comment)?;
        info!(
            "event=comment_create module=service status=ok pin_id={} comment_id={}",
            comment.pin_id, comment.id
        );
        Ok(comment)
    }

    /// Toggles the like state of `client` for the pin.
    pub fn toggle_like(
        &mut self,
        pin_id: Option<PinId>,
        client: &ClientId,
    ) -> ServiceResult<LikeState> {
        let pin_id = pin_id.ok_or(PinValidationError::MissingPinId)?;
        let state = self.repo.toggle_like(pin_id, client)?;
        info!(
            "event=like_toggle module=service status=ok pin_id={} liked={} likes_count={}",
            pin_id, state.liked, state.likes_count
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::{PinService, ServiceError};
    use crate::model::pin::{
        ClientId, Comment, LikeState, NewComment, NewPin, Pin, PinDetail, PinId,
        PinValidationError, SortOrder,
    };
    use crate::repo::pin_repo::{PinListQuery, PinRepository, RepoResult};

    /// Repository double that fails the test if any store call is made.
    struct UnreachableRepo;

    impl PinRepository for UnreachableRepo {
        fn list_pins(&mut self, _query: &PinListQuery) -> RepoResult<Vec<Pin>> {
            panic!("store must not be reached")
        }
        fn get_pin_detail(&mut self, _id: PinId) -> RepoResult<Option<PinDetail>> {
            panic!("store must not be reached")
        }
        fn create_pin(&mut self, _pin: &NewPin) -> RepoResult<Pin> {
            panic!("store must not be reached")
        }
        fn create_comment(&mut self, _comment: &NewComment) -> RepoResult<Comment> {
            panic!("store must not be reached")
        }
        fn toggle_like(&mut self, _pin_id: PinId, _client: &ClientId) -> RepoResult<LikeState> {
            panic!("store must not be reached")
        }
    }

    #[test]
    fn invalid_inputs_are_rejected_before_the_store() {
        let mut service = PinService::new(UnreachableRepo);
        let client = ClientId::new("10.0.0.1");

        let err = service.create_pin(None, None, Some("   ")).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(PinValidationError::MissingContent)
        ));

        let err = service.add_comment(None, None, Some("x")).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(PinValidationError::MissingPinId)
        ));

        let err = service.toggle_like(None, &client).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(PinValidationError::MissingPinId)
        ));
    }

    #[test]
    fn blank_search_is_dropped_from_the_query() {
        struct CapturingRepo(Option<PinListQuery>);
        impl PinRepository for CapturingRepo {
            fn list_pins(&mut self, query: &PinListQuery) -> RepoResult<Vec<Pin>> {
                self.0 = Some(query.clone());
                Ok(Vec::new())
            }
            fn get_pin_detail(&mut self, _id: PinId) -> RepoResult<Option<PinDetail>> {
                Ok(None)
            }
            fn create_pin(&mut self, _pin: &NewPin) -> RepoResult<Pin> {
                unreachable!()
            }
            fn create_comment(&mut self, _comment: &NewComment) -> RepoResult<Comment> {
                unreachable!()
            }
            fn toggle_like(&mut self, _pin_id: PinId, _client: &ClientId) -> RepoResult<LikeState> {
                unreachable!()
            }
        }

        let mut service = PinService::new(CapturingRepo(None));
        service
            .list_pins(Some("   ".to_string()), SortOrder::Oldest)
            .unwrap();
        let captured = service.repo.0.take().expect("list_pins should reach the repo");
        assert_eq!(captured.search, None);
        assert_eq!(captured.sort, SortOrder::Oldest);

        let err = service.get_pin(5).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(5)));
    }
}
