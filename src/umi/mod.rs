pub mod header;
pub mod index;
pub mod reconcile;

pub use header::parse_header_tag;
pub use header::template_identity;
pub use header::HeaderTag;
pub use header::MolecularTag;
pub use header::TemplateIdentity;
pub use header::UMI_SEPARATOR;

pub use index::IdentifierIndexer;
pub use index::TagIndex;

pub use reconcile::transform_tag;
pub use reconcile::ReconciledPair;
pub use reconcile::ReverseComplementReconciler;
