// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Pretty printers for reporting information.
use std::{borrow::Cow, sync::Mutex};

const VERTICAL: char = '│';
const UP_AND_RIGHT: char = '└';
const VERTICAL_AND_RIGHT: char = '├';

lazy_static::lazy_static! {
    static ref WARNING_PRINTER: Mutex<Vec<Vec<Cow<'static, str>>>> = Mutex::new(vec![]);
}

/// The symbol drawn before a line of a block. Only the first line of each
/// block gets a branch.
fn tree_symbol(i_line: usize, num_lines: usize, i_block: usize, num_blocks: usize) -> char {
    match (i_line, i_line + 1 == num_lines, i_block + 1 == num_blocks) {
        (0, false, _) => VERTICAL_AND_RIGHT,
        (0, _, false) => VERTICAL_AND_RIGHT,
        (0, true, true) => UP_AND_RIGHT,
        _ => VERTICAL,
    }
}

fn draw_tree(blocks: &[Vec<Cow<'static, str>>], level: log::Level) {
    let num_blocks = blocks.len();
    for (i_block, block) in blocks.iter().enumerate() {
        let num_lines = block.len();
        for (i_line, line) in block.iter().enumerate() {
            let symbol = tree_symbol(i_line, num_lines, i_block, num_blocks);
            log::log!(level, "{symbol} {line}");
        }
    }
    log::log!(level, "");
}

/// A titled summary. Each block of lines is drawn as a branch of a tree.
pub(crate) struct InfoPrinter {
    title: Cow<'static, str>,
    blocks: Vec<Vec<Cow<'static, str>>>,
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

    pub(crate) fn push_block(&mut self, block: Vec<Cow<'static, str>>) {
        self.blocks.push(block);
    }

    pub(crate) fn display(self) {
        log::info!("{}", console::style(self.title).bold());
        draw_tree(&self.blocks, log::Level::Info);
    }
}

pub(crate) trait Warn {
    fn warn(self);
}

impl Warn for &'static str {
    fn warn(self) {
        WARNING_PRINTER.lock().unwrap().push(vec![self.into()]);
    }
}

impl Warn for String {
    fn warn(self) {
        WARNING_PRINTER.lock().unwrap().push(vec![self.into()]);
    }
}

impl Warn for Cow<'static, str> {
    fn warn(self) {
        WARNING_PRINTER.lock().unwrap().push(vec![self]);
    }
}

impl Warn for Vec<Cow<'static, str>> {
    fn warn(self) {
        WARNING_PRINTER.lock().unwrap().push(self);
    }
}

/// Print out any warnings that have been collected as CLI arguments have been
/// parsed, then forget them. This should be called once all arguments have
/// been parsed into parameters.
pub(crate) fn display_warnings() {
    log::debug!("Displaying warnings");
    let mut blocks = WARNING_PRINTER.lock().unwrap();
    if blocks.is_empty() {
        return;
    }

    log::warn!("{}", console::style("Warnings").bold());
    draw_tree(&blocks, log::Level::Warn);
    blocks.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_symbols() {
        // A single one-line block.
        assert_eq!(tree_symbol(0, 1, 0, 1), UP_AND_RIGHT);
        // The first of two one-line blocks.
        assert_eq!(tree_symbol(0, 1, 0, 2), VERTICAL_AND_RIGHT);
        // A multi-line last block.
        assert_eq!(tree_symbol(0, 3, 1, 2), VERTICAL_AND_RIGHT);
        assert_eq!(tree_symbol(1, 3, 1, 2), VERTICAL);
        assert_eq!(tree_symbol(2, 3, 1, 2), VERTICAL);
    }
}
