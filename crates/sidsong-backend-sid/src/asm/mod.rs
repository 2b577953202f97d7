//! 6502 assembly generation.
//!
//! Code is built as a list of [`Item`]s and rendered to ACME source text at the
//! end. The player routines are built once ([`routines`]) and wrapped by the two
//! link layouts ([`layout`]), so both outputs always share the same tick code.
//!
//! # Example
//!
//! ```
//! use sidsong_backend_sid::asm::{Mnemonic, Operand, Program};
//!
//! let mut program = Program::new();
//! program
//!     .org(0x1000)
//!     .label("init")
//!     .op(Mnemonic::Jmp, Operand::label("init_song"))
//!     .label("play")
//!     .op(Mnemonic::Rts, Operand::Implied);
//!
//! assert_eq!(program.address_of("play"), Some(0x1003));
//! assert!(program.render().contains("        jmp init_song\n"));
//! ```

pub mod layout;
pub mod routines;

use std::collections::HashMap;
use std::fmt::Write as _;

pub use layout::{library, standalone, GeneratedSources};

/// Column where instructions and directives start.
const INDENT: &str = "        ";

/// Bytes per `!byte` line.
const BYTES_PER_LINE: usize = 16;

/// The 6502 instructions the player uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc,
    Beq,
    Bne,
    Bpl,
    Clc,
    Cli,
    Cmp,
    Cpx,
    Dec,
    Dex,
    Inc,
    Inx,
    Jmp,
    Jsr,
    Lda,
    Ldx,
    Ldy,
    Ora,
    Pha,
    Pla,
    Rti,
    Rts,
    Sei,
    Sta,
    Stx,
    Tax,
    Tay,
    Txa,
    Tya,
}

impl Mnemonic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mnemonic::Adc => "adc",
            Mnemonic::Beq => "beq",
            Mnemonic::Bne => "bne",
            Mnemonic::Bpl => "bpl",
            Mnemonic::Clc => "clc",
            Mnemonic::Cli => "cli",
            Mnemonic::Cmp => "cmp",
            Mnemonic::Cpx => "cpx",
            Mnemonic::Dec => "dec",
            Mnemonic::Dex => "dex",
            Mnemonic::Inc => "inc",
            Mnemonic::Inx => "inx",
            Mnemonic::Jmp => "jmp",
            Mnemonic::Jsr => "jsr",
            Mnemonic::Lda => "lda",
            Mnemonic::Ldx => "ldx",
            Mnemonic::Ldy => "ldy",
            Mnemonic::Ora => "ora",
            Mnemonic::Pha => "pha",
            Mnemonic::Pla => "pla",
            Mnemonic::Rti => "rti",
            Mnemonic::Rts => "rts",
            Mnemonic::Sei => "sei",
            Mnemonic::Sta => "sta",
            Mnemonic::Stx => "stx",
            Mnemonic::Tax => "tax",
            Mnemonic::Tay => "tay",
            Mnemonic::Txa => "txa",
            Mnemonic::Tya => "tya",
        }
    }

    /// Relative branches take a one-byte offset.
    pub fn is_branch(&self) -> bool {
        matches!(self, Mnemonic::Beq | Mnemonic::Bne | Mnemonic::Bpl)
    }
}

/// Instruction operand, one variant per addressing mode in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Implied,
    Immediate(u8),
    /// `#<label`
    ImmediateLo(String),
    /// `#>label`
    ImmediateHi(String),
    Absolute(u16),
    AbsoluteX(u16),
    /// A label used as an absolute address or branch target.
    Label(String),
    LabelX(String),
    LabelY(String),
}

impl Operand {
    pub fn imm(value: u8) -> Self {
        Operand::Immediate(value)
    }

    pub fn abs(addr: u16) -> Self {
        Operand::Absolute(addr)
    }

    pub fn label(name: impl Into<String>) -> Self {
        Operand::Label(name.into())
    }

    pub fn label_x(name: impl Into<String>) -> Self {
        Operand::LabelX(name.into())
    }

    pub fn label_y(name: impl Into<String>) -> Self {
        Operand::LabelY(name.into())
    }

    fn render(&self) -> Option<String> {
        match self {
            Operand::Implied => None,
            Operand::Immediate(v) => Some(format!("#${:02x}", v)),
            Operand::ImmediateLo(l) => Some(format!("#<{}", l)),
            Operand::ImmediateHi(l) => Some(format!("#>{}", l)),
            Operand::Absolute(a) => Some(hex_address(*a)),
            Operand::AbsoluteX(a) => Some(format!("{},x", hex_address(*a))),
            Operand::Label(l) => Some(l.clone()),
            Operand::LabelX(l) => Some(format!("{},x", l)),
            Operand::LabelY(l) => Some(format!("{},y", l)),
        }
    }
}

fn hex_address(addr: u16) -> String {
    if addr < 0x100 {
        format!("${:02x}", addr)
    } else {
        format!("${:04x}", addr)
    }
}

/// Encoded size of an instruction in bytes.
///
/// Numeric addresses below `$100` use zero-page forms, as the assembler picks
/// them. Labels are always placed above the zero page.
pub fn instruction_size(mnemonic: Mnemonic, operand: &Operand) -> u16 {
    match operand {
        Operand::Implied => 1,
        Operand::Immediate(_) | Operand::ImmediateLo(_) | Operand::ImmediateHi(_) => 2,
        Operand::Absolute(a) | Operand::AbsoluteX(a) => {
            if *a < 0x100 {
                2
            } else {
                3
            }
        }
        Operand::Label(_) if mnemonic.is_branch() => 2,
        Operand::Label(_) | Operand::LabelX(_) | Operand::LabelY(_) => 3,
    }
}

/// One line of a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Origin(u16),
    Label(String),
    Instruction(Mnemonic, Operand),
    Bytes(Vec<u8>),
    Comment(String),
    Blank,
}

impl Item {
    /// Bytes this item occupies in the assembled image.
    pub fn size(&self) -> u16 {
        match self {
            Item::Instruction(m, o) => instruction_size(*m, o),
            Item::Bytes(bytes) => bytes.len() as u16,
            Item::Origin(_) | Item::Label(_) | Item::Comment(_) | Item::Blank => 0,
        }
    }
}

/// An ordered list of items with a chaining builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    items: Vec<Item>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn org(&mut self, addr: u16) -> &mut Self {
        self.items.push(Item::Origin(addr));
        self
    }

    pub fn label(&mut self, name: impl Into<String>) -> &mut Self {
        self.items.push(Item::Label(name.into()));
        self
    }

    pub fn op(&mut self, mnemonic: Mnemonic, operand: Operand) -> &mut Self {
        self.items.push(Item::Instruction(mnemonic, operand));
        self
    }

    /// Shorthand for an implied-mode instruction.
    pub fn implied(&mut self, mnemonic: Mnemonic) -> &mut Self {
        self.op(mnemonic, Operand::Implied)
    }

    pub fn bytes(&mut self, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.items.push(Item::Bytes(bytes.into()));
        self
    }

    /// A labelled byte table.
    pub fn table(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.label(name).bytes(bytes)
    }

    pub fn comment(&mut self, text: impl Into<String>) -> &mut Self {
        self.items.push(Item::Comment(text.into()));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.items.push(Item::Blank);
        self
    }

    pub fn append(&mut self, other: &Program) -> &mut Self {
        self.items.extend(other.items.iter().cloned());
        self
    }

    /// Address of every label, following origin directives.
    pub fn label_addresses(&self) -> HashMap<&str, u16> {
        let mut pc: u16 = 0;
        let mut labels = HashMap::new();
        for item in &self.items {
            match item {
                Item::Origin(addr) => pc = *addr,
                Item::Label(name) => {
                    labels.insert(name.as_str(), pc);
                }
                other => pc = pc.wrapping_add(other.size()),
            }
        }
        labels
    }

    pub fn address_of(&self, label: &str) -> Option<u16> {
        self.label_addresses().get(label).copied()
    }

    /// Total bytes emitted by instructions and data.
    pub fn code_size(&self) -> usize {
        self.items.iter().map(|i| i.size() as usize).sum()
    }

    /// Render as ACME source text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            // Writing to a String cannot fail.
            let _ = match item {
                Item::Origin(addr) => writeln!(out, "* = ${:04x}", addr),
                Item::Label(name) => writeln!(out, "{}", name),
                Item::Instruction(m, operand) => match operand.render() {
                    Some(arg) => writeln!(out, "{}{} {}", INDENT, m.as_str(), arg),
                    None => writeln!(out, "{}{}", INDENT, m.as_str()),
                },
                Item::Bytes(bytes) => {
                    for chunk in bytes.chunks(BYTES_PER_LINE) {
                        let list = chunk
                            .iter()
                            .map(|b| format!("${:02x}", b))
                            .collect::<Vec<_>>()
                            .join(", ");
                        let _ = writeln!(out, "{}!byte {}", INDENT, list);
                    }
                    Ok(())
                }
                Item::Comment(text) => writeln!(out, "; {}", text),
                Item::Blank => writeln!(out),
            };
        }
        out
    }
}
