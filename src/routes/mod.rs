//! Router Module Index
//!
//! The guard composition is declared per route class, never mutated at
//! runtime. Every route falls into one of these classes, each with a fixed
//! guard order (authentication before existence, existence before
//! ownership):
//!
//! | Route class                    | Guards in order                        |
//! |--------------------------------|----------------------------------------|
//! | Public read (list, detail)     | ExistingPost (detail only)             |
//! | Signup / Login                 | none (validation only)                 |
//! | Authenticated create / renew   | AuthUser                               |
//! | "My posts" listing             | AuthUser                               |
//! | Profile-scoped listing         | AuthUser, target-user existence        |
//! | Mutate (update / delete)       | AuthUser, ExistingPost, OwnedPost      |
//!
//! The fully-protected route groups additionally sit behind a router-level
//! authentication layer, so a handler can never be reached by an anonymous
//! caller even if its extractor list were wrong.

/// Signup, login and token renewal.
pub mod auth;

/// Post listing, detail and CRUD.
pub mod posts;

/// Presigned-URL generation for direct image uploads.
pub mod uploads;
