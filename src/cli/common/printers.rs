// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pretty printers for reporting information.
//!
//! Blocks of lines are drawn as a tree under a bold title, e.g.
//!
//! ```text
//! Counter log
//! ├ File: run1.dat
//! ├ 3600 records
//! │ starting 2023-11-14T22:13:20 UTC
//! └ 2 header lines
//! ```

use std::{
    borrow::Cow,
    sync::{Mutex, PoisonError},
};

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

type Block = Vec<Cow<'static, str>>;

lazy_static::lazy_static! {
    static ref WARNINGS: Mutex<Vec<Block>> = Mutex::new(vec![]);
}

/// Prefix every line of `blocks` with its tree symbol. The first line of a
/// block gets a branch, continuation lines a vertical bar, and the very last
/// block (if it's a single line) closes the tree.
fn tree(blocks: &[Block]) -> Vec<String> {
    let num_blocks = blocks.len();
    let mut lines = vec![];
    for (i_block, block) in blocks.iter().enumerate() {
        let last_block = i_block + 1 == num_blocks;
        for (i_line, line) in block.iter().enumerate() {
            let symbol = match (i_line, block.len() == 1 && last_block) {
                (0, true) => UP_AND_RIGHT,
                (0, false) => VERTICAL_AND_RIGHT,
                _ => VERTICAL,
            };
            lines.push(format!("{symbol} {line}"));
        }
    }
    lines
}

/// Collects blocks of information and logs them at the info level in one go.
pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Block>,
}

impl InfoPrinter {
    pub(crate) fn new(title: Cow<'static, str>) -> Self {
        Self {
            title,
            blocks: vec![],
        }
    }

    pub(crate) fn push_line(&mut self, line: Cow<'static, str>) {
        self.blocks.push(vec![line]);
    }

    pub(crate) fn push_block(&mut self, block: Block) {
        if !block.is_empty() {
            self.blocks.push(block);
        }
    }

    pub(crate) fn display(self) {
        log::info!("{}", console::style(&self.title).bold());
        for line in tree(&self.blocks) {
            log::info!("{line}");
        }
        log::info!("");
    }
}

/// Things that can be deferred to the warnings block.
pub(crate) trait Warn {
    fn warn(self);
}

fn push_warning(block: Block) {
    WARNINGS
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(block);
}

impl Warn for &'static str {
    fn warn(self) {
        push_warning(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        push_warning(vec![self.into()]);
    }
}

impl Warn for Cow<'static, str> {
    fn warn(self) {
        push_warning(vec![self]);
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        push_warning(self);
    }
}

/// Print out any warnings that have been collected while parsing arguments,
/// then forget them. This should be called once all arguments have been
/// parsed into parameters.
pub(crate) fn display_warnings() {
    let mut warnings = WARNINGS.lock().unwrap_or_else(PoisonError::into_inner);
    log::debug!("Displaying {} warnings", warnings.len());
    if warnings.is_empty() {
        return;
    }

    log::warn!("{}", console::style("Warnings").bold());
    for line in tree(&warnings) {
        log::warn!("{line}");
    }
    log::warn!("");
    warnings.clear();
}
