//! Conversational assistant core for the `EchoScript` transcription service,
//! built to satisfy a strict lint policy.

// Interdiction stricte de pratiques dangereuses ou non idiomatiques
#![deny(warnings)] // Tous les warnings sont traités comme des erreurs
#![deny(unsafe_code)] // Le code unsafe est interdit
#![deny(missing_docs)] // Toute fonction, struct, enum ou module public doit être documenté
#![deny(non_camel_case_types)]
// Les types doivent suivre la convention CamelCase (exception explicite possible au besoin)

// Options supplémentaires pour ne rien laisser passer
#![deny(unused_imports)] // Les imports inutilisés sont interdits
#![deny(unused_variables)] // Les variables inutilisés sont interdits
#![deny(unused_must_use)] // Oblige à gérer explicitement les Result et Option
#![deny(non_snake_case)] // Les noms de variables et fonctions doivent être en snake_case
#![deny(non_upper_case_globals)] // Les constantes et globals doivent être en MAJUSCULE
#![deny(nonstandard_style)] // Empêche tout style de code non standard
#![forbid(unsafe_op_in_unsafe_fn)]
// Interdit l'utilisation d'unsafe même dans une fonction unsafe

// Clippy pour stricte discipline
#![deny(clippy::all)] // Active toutes les lints Clippy standard
#![deny(clippy::unwrap_used)] // Interdit unwrap()
#![deny(clippy::expect_used)] // Interdit expect()
#![deny(clippy::panic)] // Interdit panic!()
#![deny(clippy::print_stdout)] // Interdit println!() en production
#![deny(clippy::todo)] // Interdit les TODO dans le code
#![deny(clippy::unimplemented)] // Interdit les fonctions non implémentées

/// Fire-and-forget analytics event delivery.
pub mod analytics;
/// Sentiment classification over the chat model.
pub mod classify;
/// Streaming completion transport and token stream plumbing.
pub mod completion;
/// Conversation state and durable history storage.
pub mod conversation;
/// Core types: errors, configuration, ids, messages, sentiment.
pub mod core;
/// Embedding model wrapper.
pub mod embedding;
/// Append-only vector memory indices.
pub mod memory;
/// System prompt assembly.
pub mod prompt;
/// Exchange orchestration.
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
