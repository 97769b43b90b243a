use std::fmt;
use std::sync::Arc;

use dsv_crypto::Signer;
use dsv_dataset::{JsonSchemaValidator, SchemaValidator};
use dsv_types::ProfileId;

use crate::clock::{Clock, SystemClock};
use crate::describe::BodyChangePolicy;

/// Options and collaborators for [`create`](crate::create).
#[derive(Clone)]
pub struct CreateConfig {
    /// Signs the new commit. Creating a version without one fails.
    pub signer: Option<Arc<dyn Signer>>,
    pub clock: Arc<dyn Clock>,
    /// Commit author. Defaults to the signer's profile.
    pub author: Option<ProfileId>,
    /// Reject bodies with any row that fails schema validation.
    pub strict: bool,
    /// Create a version even when nothing changed.
    pub force: bool,
    /// Pin the written manifest in the store.
    pub pin: bool,
    pub body_policy: BodyChangePolicy,
    pub validator: Arc<dyn SchemaValidator>,
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            signer: None,
            clock: Arc::new(SystemClock),
            author: None,
            strict: false,
            force: false,
            pin: true,
            body_policy: BodyChangePolicy::default(),
            validator: Arc::new(JsonSchemaValidator),
        }
    }
}

impl CreateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_author(mut self, author: ProfileId) -> Self {
        self.author = Some(author);
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn pin(mut self, pin: bool) -> Self {
        self.pin = pin;
        self
    }

    pub fn with_body_policy(mut self, policy: BodyChangePolicy) -> Self {
        self.body_policy = policy;
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// The author recorded on new commits.
    pub fn effective_author(&self) -> Option<ProfileId> {
        self.author
            .clone()
            .or_else(|| self.signer.as_ref().map(|s| s.profile_id()))
    }
}

impl fmt::Debug for CreateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateConfig")
            .field("signer", &self.signer.is_some())
            .field("author", &self.author)
            .field("strict", &self.strict)
            .field("force", &self.force)
            .field("pin", &self.pin)
            .field("body_policy", &self.body_policy)
            .finish_non_exhaustive()
    }
}
