// SPDX-FileCopyrightText: 2026 Meu Bolso Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for the relay's tables.

pub mod links;
pub mod transactions;
pub mod usage;
