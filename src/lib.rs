//! postwright: a headless editor core for a single post (title, rich-text
//! content, derived slug, featured image) backed by a remote
//! document-and-file storage service.
//!
//! Two pieces do the real work: the form layer in [`form`] keeps the slug
//! field synchronized with the title as the user types, and [`submit`]
//! reconciles form values with the remote stores on submit. [`storage`]
//! provides the collaborator seams plus a reqwest client implementing them.
//!
//! Layout, routing, toasts, and auth state are the embedder's problem: the
//! reconciler takes the current user id and a navigation callback as plain
//! parameters, and reports through the [`submit::Notifier`] seam.

pub mod config;
pub mod form;
pub mod model;
pub mod slug;
pub mod storage;
pub mod submit;

pub use form::{attach_slug_deriver, PostForm, Subscription, ValidationError};
pub use model::{Field, FormState, NewPost, PostRecord, PostUpdate, StoredFile};
pub use slug::slugify_title;
pub use storage::{FileStore, RecordStore, StorageClient, StorageIds};
pub use submit::{reconcile, submit_post, LogNotifier, Notifier, SubmitError};
