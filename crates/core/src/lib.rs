//! measure-repo-core: FHIR artifact checks for Measure Repository Service
//! conformance testing.
//!
//! This crate holds the pure, synchronous logic the conformance suite relies
//! on: the typed resource model, identifier-token matching, locating the root
//! artifact of a `$package` Bundle, and verifying the Bundle's artifact
//! closure.

pub mod bundle;
pub mod capability;
pub mod closure;
pub mod data_requirements;
pub mod error;
pub mod identifier;
pub mod locate;
pub mod outcome;
pub mod resource;

pub use bundle::{Bundle, BundleEntry, BundleType};
pub use capability::{CapabilityResource, CapabilityRest, CapabilityStatement};
pub use closure::{
    ArtifactReference, ClosureCheck, MODEL_INFO_REFERENCE, ReferenceCheck,
    related_artifacts_present,
};
pub use error::ResourceError;
pub use identifier::{
    IdentifierMatch, IdentifierToken, resource_has_matching_identifier,
    resource_has_matching_identifier_with, split_identifier,
};
pub use locate::{ArtifactType, MatchKind, find_entry, find_entry_with, find_library, find_measure};
pub use outcome::{IssueSeverity, IssueType, OperationOutcome, OperationOutcomeIssue};
pub use resource::{
    ArtifactMeta, CodeFilter, CodeableConcept, Coding, DataRequirement, Identifier, Library,
    Measure, OtherResource, RelatedArtifact, Resource, ValueSet,
};
