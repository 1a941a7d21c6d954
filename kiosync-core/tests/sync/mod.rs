// SPDX-FileCopyrightText: 2026 Kiosync Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the offline sync engine


mod assets_tests;
mod snapshot_tests;
