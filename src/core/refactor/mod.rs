//! Namespace refactoring: keep a file's declared namespace in line with its
//! directory and point every import of its symbol at the corrected namespace.

pub mod declaration;
pub mod fix;
pub mod locate;
pub mod namespace;
pub mod references;
pub mod search;

pub use declaration::{
    extract_declaration, rewrite_declaration, Declaration, DeclarationChange, DeclarationEdit,
};
pub use fix::{
    fix_file, DeclarationStatus, FixEvent, FixOptions, FixReport, ReferenceSite,
    RenameOperation, SearchStatus,
};
pub use locate::{locate_references, resolve_module_root, search_roots, Located, SkipReason};
pub use namespace::{derive_namespace, NamespacePath};
pub use references::{rewrite_references, ReferenceEdit, ReferenceEditKind, ReferenceRewrite};
pub use search::{GrepSearch, ReferenceSearch, ScanSearch, SearchBackend, SearchQuery};
