// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message intake pipeline for the bolso WhatsApp relay.
//!
//! A webhook event flows through [`Dispatcher`]: sender identity and
//! verification-code linking, the monthly quota gate, content normalization,
//! AI extraction, and transaction commit with a Portuguese confirmation.
//! Collaborators are injected as `Arc<dyn Trait>` from `bolso-core`.

pub mod clock;
pub mod commit;
pub mod dispatcher;
pub mod extraction;
pub mod identity;
pub mod metrics;
pub mod normalize;
pub mod prompt;
pub mod quota;
pub mod replies;

pub use clock::ReferenceClock;
pub use commit::{CommitReport, TransactionCommitter, WarningPolicy};
pub use dispatcher::{Acknowledgement, DispatchOutcome, Dispatcher};
pub use extraction::{ExtractionResult, Extractor, ParseOutcome};
pub use identity::{IdentityResolver, SenderId};
pub use normalize::{ContentNormalizer, Normalized, NormalizedContent};
pub use quota::QuotaGate;
