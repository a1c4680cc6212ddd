//! The interpreter: one frame per method activation, with an operand stack
//! of 32-bit slots, a local-variable array, and an opcode dispatcher.

use crate::jvm::{
    class::{
        Attribute, AttributeInfo, ClassMember,
        constant_pool::{self, ConstantPool, Entry},
    },
    code::Code,
    opcode,
    parsing,
    vm::Heap,
};

/// An error raised while executing bytecode.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The dispatcher met a byte it has no handler for.
    #[error("unknown opcode {opcode:#04x} at {pc}")]
    UnknownOpcode {
        /// The fetched opcode byte.
        opcode: u8,
        /// The address the opcode was fetched from.
        pc: u32,
    },
    /// The opcode is reserved but deliberately not implemented.
    #[error("opcode {0} is not implemented")]
    UnimplementedOpcode(&'static str),
    /// `ldc` met a constant kind the interpreter cannot push.
    #[error("ldc does not support {0} constants")]
    UnsupportedLdcKind(&'static str),
    /// A pop was issued against an empty operand stack.
    #[error("operand stack underflow")]
    StackUnderflow,
    /// A local-variable access is past the frame's `max_locals`.
    #[error("local variable index {0} is out of range")]
    LocalIndexOutOfRange(u16),
    /// Integer division or remainder by zero.
    #[error("integer division by zero")]
    DivisionByZero,
    /// No array or instance is registered under the popped reference.
    #[error("no heap object registered under reference {0}")]
    UnknownReference(u32),
    /// A branch target does not fit the program counter.
    #[error("invalid branch target at {pc} (offset {offset})")]
    InvalidJumpTarget {
        /// The address of the branch opcode.
        pc: u32,
        /// The relative offset it carried.
        offset: i32,
    },
    /// The code array ends in the middle of an instruction.
    #[error("code ends in the middle of the instruction at {0}")]
    TruncatedInstruction(u32),
    /// An error when consulting the constant pool.
    #[error(transparent)]
    ConstantPool(#[from] constant_pool::Error),
    /// An error while locating or dissecting the `Code` attribute.
    #[error(transparent)]
    Parse(#[from] parsing::Error),
}

/// The operand stack of a frame: a growable block of 32-bit slots.
///
/// 64-bit values occupy two adjacent slots with the high half pushed first
/// (sitting deeper); floats and doubles travel by bit pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperandStack {
    slots: Vec<u32>,
}

impl OperandStack {
    /// An empty stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// An empty stack with room for `max_stack` slots.
    #[must_use]
    pub fn with_capacity(max_stack: u16) -> Self {
        Self {
            slots: Vec::with_capacity(max_stack.into()),
        }
    }

    /// The current depth in slots.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.slots.len()
    }

    /// The raw slots, bottom first.
    #[must_use]
    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    /// Pushes one raw slot.
    pub fn push_slot(&mut self, slot: u32) {
        self.slots.push(slot);
    }

    /// Pops one raw slot.
    ///
    /// # Errors
    /// [`Error::StackUnderflow`] on an empty stack.
    pub fn pop_slot(&mut self) -> Result<u32, Error> {
        self.slots.pop().ok_or(Error::StackUnderflow)
    }

    /// Pushes a 32-bit integer.
    pub fn push_int(&mut self, value: i32) {
        self.push_slot(value as u32);
    }

    /// Pops a 32-bit integer.
    ///
    /// # Errors
    /// [`Error::StackUnderflow`] on an empty stack.
    pub fn pop_int(&mut self) -> Result<i32, Error> {
        Ok(self.pop_slot()? as i32)
    }

    /// Pushes a float by bit pattern.
    pub fn push_float(&mut self, value: f32) {
        self.push_slot(value.to_bits());
    }

    /// Pops a float by bit pattern.
    ///
    /// # Errors
    /// [`Error::StackUnderflow`] on an empty stack.
    pub fn pop_float(&mut self) -> Result<f32, Error> {
        Ok(f32::from_bits(self.pop_slot()?))
    }

    /// Pushes a 64-bit integer as two slots, high half first.
    pub fn push_long(&mut self, value: i64) {
        let bits = value as u64;
        self.push_slot((bits >> 32) as u32);
        self.push_slot(bits as u32);
    }

    /// Pops a 64-bit integer from two slots.
    ///
    /// # Errors
    /// [`Error::StackUnderflow`] when fewer than two slots remain.
    pub fn pop_long(&mut self) -> Result<i64, Error> {
        let low = self.pop_slot()?;
        let high = self.pop_slot()?;
        Ok(((u64::from(high) << 32) | u64::from(low)) as i64)
    }

    /// Pushes a double by bit pattern, high half first.
    pub fn push_double(&mut self, value: f64) {
        self.push_long(value.to_bits() as i64);
    }

    /// Pops a double by bit pattern.
    ///
    /// # Errors
    /// [`Error::StackUnderflow`] when fewer than two slots remain.
    pub fn pop_double(&mut self) -> Result<f64, Error> {
        Ok(f64::from_bits(self.pop_long()? as u64))
    }

    /// Pushes a heap reference.
    pub fn push_reference(&mut self, reference: u32) {
        self.push_slot(reference);
    }

    /// Pops a heap reference.
    ///
    /// # Errors
    /// [`Error::StackUnderflow`] on an empty stack.
    pub fn pop_reference(&mut self) -> Result<u32, Error> {
        self.pop_slot()
    }
}

/// The local-variable array of a frame, indexed by instruction operands.
/// 64-bit values occupy two adjacent indices, high half at the lower one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalVariables {
    slots: Vec<u32>,
}

impl LocalVariables {
    /// A zero-initialised array of `max_locals` slots.
    #[must_use]
    pub fn new(max_locals: u16) -> Self {
        Self {
            slots: vec![0; max_locals.into()],
        }
    }

    /// The raw slots.
    #[must_use]
    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    /// Reads one slot.
    ///
    /// # Errors
    /// [`Error::LocalIndexOutOfRange`] past `max_locals`.
    pub fn get(&self, index: u16) -> Result<u32, Error> {
        self.slots
            .get(usize::from(index))
            .copied()
            .ok_or(Error::LocalIndexOutOfRange(index))
    }

    /// Writes one slot.
    ///
    /// # Errors
    /// [`Error::LocalIndexOutOfRange`] past `max_locals`.
    pub fn set(&mut self, index: u16, slot: u32) -> Result<(), Error> {
        *self
            .slots
            .get_mut(usize::from(index))
            .ok_or(Error::LocalIndexOutOfRange(index))? = slot;
        Ok(())
    }
}

/// One activation record of a method: program counter, operand stack, and
/// locals over an immutable bytecode stream.
#[derive(Debug)]
pub struct Frame<'c> {
    constants: &'c ConstantPool,
    method: &'c ClassMember,
    code: Code<'c>,
    pc: u32,
    stack: OperandStack,
    locals: LocalVariables,
    trace: bool,
}

impl<'c> Frame<'c> {
    /// Creates a frame over the given method's `Code` attribute, sizing the
    /// operand stack and locals from its headers.
    ///
    /// # Errors
    /// [`parsing::Error::AttributeNotFound`] when the method has no `Code`
    /// attribute; any error of [`Code::parse`].
    pub fn new(constants: &'c ConstantPool, method: &'c ClassMember) -> Result<Self, Error> {
        let attribute = method.attributes().get(Attribute::CODE)?;
        let AttributeInfo::Code(body) = attribute.info() else {
            return Err(parsing::Error::AttributeNotFound(Attribute::CODE.to_owned()).into());
        };
        let code = Code::parse(body)?;
        Ok(Self {
            constants,
            method,
            pc: 0,
            stack: OperandStack::with_capacity(code.max_stack),
            locals: LocalVariables::new(code.max_locals),
            code,
            trace: false,
        })
    }

    /// Enables or disables per-opcode trace logging.
    #[must_use]
    pub const fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// The executing method.
    #[must_use]
    pub const fn method(&self) -> &'c ClassMember {
        self.method
    }

    /// The current program counter.
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// The operand stack.
    #[must_use]
    pub const fn stack(&self) -> &OperandStack {
        &self.stack
    }

    /// The operand stack, mutable; used to seed arguments.
    pub const fn stack_mut(&mut self) -> &mut OperandStack {
        &mut self.stack
    }

    /// The local-variable array.
    #[must_use]
    pub const fn locals(&self) -> &LocalVariables {
        &self.locals
    }

    /// The local-variable array, mutable; used to seed arguments.
    pub const fn locals_mut(&mut self) -> &mut LocalVariables {
        &mut self.locals
    }

    /// Consumes the frame, keeping its operand stack.
    #[must_use]
    pub fn into_stack(self) -> OperandStack {
        self.stack
    }

    /// Executes until the program counter runs off the end of the code
    /// array or an execution error surfaces.
    ///
    /// # Errors
    /// See [`Error`].
    pub fn run(&mut self, heap: &mut Heap) -> Result<(), Error> {
        while (self.pc as usize) < self.code.bytecode.len() {
            self.step(heap)?;
        }
        Ok(())
    }

    /// Fetches and executes exactly one instruction.
    ///
    /// # Errors
    /// See [`Error`].
    #[allow(clippy::too_many_lines)]
    pub fn step(&mut self, heap: &mut Heap) -> Result<(), Error> {
        let at = self.pc;
        let opcode = self.fetch_u1()?;
        if self.trace {
            log::trace!("{at:5} {opcode:#04x}");
        }
        match opcode {
            opcode::NOP => {}
            opcode::ACONST_NULL => self.stack.push_reference(0),
            opcode::ICONST_M1 => self.stack.push_int(-1),
            opcode::ICONST_0 => self.stack.push_int(0),
            opcode::ICONST_1 => self.stack.push_int(1),
            opcode::ICONST_2 => self.stack.push_int(2),
            opcode::ICONST_3 => self.stack.push_int(3),
            opcode::ICONST_4 => self.stack.push_int(4),
            opcode::ICONST_5 => self.stack.push_int(5),
            opcode::LCONST_0 => self.stack.push_long(0),
            opcode::LCONST_1 => self.stack.push_long(1),
            opcode::FCONST_0 => self.stack.push_float(0.0),
            opcode::FCONST_1 => self.stack.push_float(1.0),
            opcode::FCONST_2 => self.stack.push_float(2.0),
            opcode::DCONST_0 => self.stack.push_double(0.0),
            opcode::DCONST_1 => self.stack.push_double(1.0),
            opcode::BIPUSH => {
                let value = self.fetch_u1()? as i8;
                self.stack.push_int(value.into());
            }
            opcode::SIPUSH => {
                let value = self.fetch_i16()?;
                self.stack.push_int(value.into());
            }
            opcode::LDC => {
                let index = self.fetch_u1()?.into();
                self.ldc(index)?;
            }
            opcode::LDC_W => {
                let index = self.fetch_u2()?;
                self.ldc(index)?;
            }
            opcode::LDC2_W => {
                let index = self.fetch_u2()?;
                match self.constants.get_entry(index)? {
                    Entry::Long(value) => self.stack.push_long(*value),
                    Entry::Double(value) => self.stack.push_double(*value),
                    other => return Err(Error::UnsupportedLdcKind(other.kind())),
                }
            }

            opcode::ILOAD | opcode::FLOAD | opcode::ALOAD => {
                let index = self.fetch_u1()?.into();
                self.load(index)?;
            }
            opcode::LLOAD | opcode::DLOAD => {
                let index = self.fetch_u1()?.into();
                self.load2(index)?;
            }
            opcode::ILOAD_0 | opcode::FLOAD_0 | opcode::ALOAD_0 => self.load(0)?,
            opcode::ILOAD_1 | opcode::FLOAD_1 | opcode::ALOAD_1 => self.load(1)?,
            opcode::ILOAD_2 | opcode::FLOAD_2 | opcode::ALOAD_2 => self.load(2)?,
            opcode::ILOAD_3 | opcode::FLOAD_3 | opcode::ALOAD_3 => self.load(3)?,
            opcode::LLOAD_0 | opcode::DLOAD_0 => self.load2(0)?,
            opcode::LLOAD_1 | opcode::DLOAD_1 => self.load2(1)?,
            opcode::LLOAD_2 | opcode::DLOAD_2 => self.load2(2)?,
            opcode::LLOAD_3 | opcode::DLOAD_3 => self.load2(3)?,

            opcode::ISTORE | opcode::FSTORE | opcode::ASTORE => {
                let index = self.fetch_u1()?.into();
                self.store(index)?;
            }
            opcode::LSTORE | opcode::DSTORE => {
                let index = self.fetch_u1()?.into();
                self.store2(index)?;
            }
            opcode::ISTORE_0 | opcode::FSTORE_0 | opcode::ASTORE_0 => self.store(0)?,
            opcode::ISTORE_1 | opcode::FSTORE_1 | opcode::ASTORE_1 => self.store(1)?,
            opcode::ISTORE_2 | opcode::FSTORE_2 | opcode::ASTORE_2 => self.store(2)?,
            opcode::ISTORE_3 | opcode::FSTORE_3 | opcode::ASTORE_3 => self.store(3)?,
            opcode::LSTORE_0 | opcode::DSTORE_0 => self.store2(0)?,
            opcode::LSTORE_1 | opcode::DSTORE_1 => self.store2(1)?,
            opcode::LSTORE_2 | opcode::DSTORE_2 => self.store2(2)?,
            opcode::LSTORE_3 | opcode::DSTORE_3 => self.store2(3)?,

            opcode::IALOAD
            | opcode::FALOAD
            | opcode::AALOAD
            | opcode::BALOAD
            | opcode::CALOAD
            | opcode::SALOAD => self.array_load(heap, false)?,
            opcode::LALOAD | opcode::DALOAD => self.array_load(heap, true)?,
            opcode::IASTORE
            | opcode::FASTORE
            | opcode::AASTORE
            | opcode::BASTORE
            | opcode::CASTORE
            | opcode::SASTORE => self.array_store(heap, false)?,
            opcode::LASTORE | opcode::DASTORE => self.array_store(heap, true)?,

            opcode::POP => {
                self.stack.pop_slot()?;
            }
            opcode::POP2 => {
                self.stack.pop_slot()?;
                self.stack.pop_slot()?;
            }
            opcode::DUP => {
                let value = self.stack.pop_slot()?;
                self.stack.push_slot(value);
                self.stack.push_slot(value);
            }
            opcode::DUP_X1 => {
                let value1 = self.stack.pop_slot()?;
                let value2 = self.stack.pop_slot()?;
                self.stack.push_slot(value1);
                self.stack.push_slot(value2);
                self.stack.push_slot(value1);
            }
            opcode::DUP_X2 => {
                let value1 = self.stack.pop_slot()?;
                let value2 = self.stack.pop_slot()?;
                let value3 = self.stack.pop_slot()?;
                self.stack.push_slot(value1);
                self.stack.push_slot(value3);
                self.stack.push_slot(value2);
                self.stack.push_slot(value1);
            }
            opcode::DUP2 => {
                let value1 = self.stack.pop_slot()?;
                let value2 = self.stack.pop_slot()?;
                self.stack.push_slot(value2);
                self.stack.push_slot(value1);
                self.stack.push_slot(value2);
                self.stack.push_slot(value1);
            }
            opcode::DUP2_X1 => {
                let value1 = self.stack.pop_slot()?;
                let value2 = self.stack.pop_slot()?;
                let value3 = self.stack.pop_slot()?;
                self.stack.push_slot(value2);
                self.stack.push_slot(value1);
                self.stack.push_slot(value3);
                self.stack.push_slot(value2);
                self.stack.push_slot(value1);
            }
            opcode::DUP2_X2 => {
                let value1 = self.stack.pop_slot()?;
                let value2 = self.stack.pop_slot()?;
                let value3 = self.stack.pop_slot()?;
                let value4 = self.stack.pop_slot()?;
                self.stack.push_slot(value2);
                self.stack.push_slot(value1);
                self.stack.push_slot(value4);
                self.stack.push_slot(value3);
                self.stack.push_slot(value2);
                self.stack.push_slot(value1);
            }
            opcode::SWAP => {
                let value1 = self.stack.pop_slot()?;
                let value2 = self.stack.pop_slot()?;
                self.stack.push_slot(value1);
                self.stack.push_slot(value2);
            }

            opcode::IADD => self.int_binop(i32::wrapping_add)?,
            opcode::LADD => self.long_binop(i64::wrapping_add)?,
            opcode::FADD => self.float_binop(|lhs, rhs| lhs + rhs)?,
            opcode::DADD => self.double_binop(|lhs, rhs| lhs + rhs)?,
            opcode::ISUB => self.int_binop(i32::wrapping_sub)?,
            opcode::LSUB => self.long_binop(i64::wrapping_sub)?,
            opcode::FSUB => self.float_binop(|lhs, rhs| lhs - rhs)?,
            opcode::DSUB => self.double_binop(|lhs, rhs| lhs - rhs)?,
            opcode::IMUL => self.int_binop(i32::wrapping_mul)?,
            opcode::LMUL => self.long_binop(i64::wrapping_mul)?,
            opcode::FMUL => self.float_binop(|lhs, rhs| lhs * rhs)?,
            opcode::DMUL => self.double_binop(|lhs, rhs| lhs * rhs)?,
            opcode::IDIV => {
                let rhs = self.stack.pop_int()?;
                let lhs = self.stack.pop_int()?;
                if rhs == 0 {
                    return Err(Error::DivisionByZero);
                }
                self.stack.push_int(lhs.wrapping_div(rhs));
            }
            opcode::LDIV => {
                let rhs = self.stack.pop_long()?;
                let lhs = self.stack.pop_long()?;
                if rhs == 0 {
                    return Err(Error::DivisionByZero);
                }
                self.stack.push_long(lhs.wrapping_div(rhs));
            }
            opcode::FDIV => self.float_binop(|lhs, rhs| lhs / rhs)?,
            opcode::DDIV => self.double_binop(|lhs, rhs| lhs / rhs)?,
            opcode::IREM => {
                let rhs = self.stack.pop_int()?;
                let lhs = self.stack.pop_int()?;
                if rhs == 0 {
                    return Err(Error::DivisionByZero);
                }
                self.stack.push_int(lhs.wrapping_rem(rhs));
            }
            opcode::LREM => {
                let rhs = self.stack.pop_long()?;
                let lhs = self.stack.pop_long()?;
                if rhs == 0 {
                    return Err(Error::DivisionByZero);
                }
                self.stack.push_long(lhs.wrapping_rem(rhs));
            }
            opcode::FREM => self.float_binop(|lhs, rhs| lhs % rhs)?,
            opcode::DREM => self.double_binop(|lhs, rhs| lhs % rhs)?,
            opcode::INEG => {
                let value = self.stack.pop_int()?;
                self.stack.push_int(value.wrapping_neg());
            }
            opcode::LNEG => {
                let value = self.stack.pop_long()?;
                self.stack.push_long(value.wrapping_neg());
            }
            opcode::FNEG => {
                let value = self.stack.pop_float()?;
                self.stack.push_float(-value);
            }
            opcode::DNEG => {
                let value = self.stack.pop_double()?;
                self.stack.push_double(-value);
            }
            opcode::ISHL => self.int_binop(|value, shift| value << (shift & 0x1F))?,
            opcode::LSHL => {
                let shift = self.stack.pop_int()?;
                let value = self.stack.pop_long()?;
                self.stack.push_long(value << (shift & 0x3F));
            }
            opcode::ISHR => self.int_binop(|value, shift| value >> (shift & 0x1F))?,
            opcode::LSHR => {
                let shift = self.stack.pop_int()?;
                let value = self.stack.pop_long()?;
                self.stack.push_long(value >> (shift & 0x3F));
            }
            opcode::IUSHR => self.int_binop(|value, shift| {
                ((value as u32) >> (shift & 0x1F)) as i32
            })?,
            opcode::LUSHR => {
                let shift = self.stack.pop_int()?;
                let value = self.stack.pop_long()?;
                self.stack
                    .push_long(((value as u64) >> (shift & 0x3F)) as i64);
            }
            opcode::IAND => self.int_binop(|lhs, rhs| lhs & rhs)?,
            opcode::LAND => self.long_binop(|lhs, rhs| lhs & rhs)?,
            opcode::IOR => self.int_binop(|lhs, rhs| lhs | rhs)?,
            opcode::LOR => self.long_binop(|lhs, rhs| lhs | rhs)?,
            opcode::IXOR => self.int_binop(|lhs, rhs| lhs ^ rhs)?,
            opcode::LXOR => self.long_binop(|lhs, rhs| lhs ^ rhs)?,
            opcode::IINC => {
                let index = u16::from(self.fetch_u1()?);
                let constant = i32::from(self.fetch_u1()? as i8);
                let value = self.locals.get(index)? as i32;
                self.locals
                    .set(index, value.wrapping_add(constant) as u32)?;
            }

            opcode::I2L => {
                let value = self.stack.pop_int()?;
                self.stack.push_long(value.into());
            }
            opcode::I2F => {
                let value = self.stack.pop_int()?;
                self.stack.push_float(value as f32);
            }
            opcode::I2D => {
                let value = self.stack.pop_int()?;
                self.stack.push_double(value.into());
            }
            opcode::L2I => {
                let value = self.stack.pop_long()?;
                self.stack.push_int(value as i32);
            }
            opcode::L2F => {
                let value = self.stack.pop_long()?;
                self.stack.push_float(value as f32);
            }
            opcode::L2D => {
                let value = self.stack.pop_long()?;
                self.stack.push_double(value as f64);
            }
            opcode::F2I => {
                let value = self.stack.pop_float()?;
                self.stack.push_int(value as i32);
            }
            opcode::F2L => {
                let value = self.stack.pop_float()?;
                self.stack.push_long(value as i64);
            }
            opcode::F2D => {
                let value = self.stack.pop_float()?;
                self.stack.push_double(value.into());
            }
            opcode::D2I => {
                let value = self.stack.pop_double()?;
                self.stack.push_int(value as i32);
            }
            opcode::D2L => {
                let value = self.stack.pop_double()?;
                self.stack.push_long(value as i64);
            }
            opcode::D2F => {
                let value = self.stack.pop_double()?;
                self.stack.push_float(value as f32);
            }
            opcode::I2B => {
                let value = self.stack.pop_int()?;
                self.stack.push_int((value << 24) >> 24);
            }
            opcode::I2S => {
                let value = self.stack.pop_int()?;
                self.stack.push_int((value << 16) >> 16);
            }

            opcode::LCMP => {
                let rhs = self.stack.pop_long()?;
                let lhs = self.stack.pop_long()?;
                self.stack.push_int(compare(lhs, rhs, 0));
            }
            opcode::FCMPL => {
                let rhs = self.stack.pop_float()?;
                let lhs = self.stack.pop_float()?;
                self.stack.push_int(compare(lhs, rhs, -1));
            }
            opcode::FCMPG => {
                let rhs = self.stack.pop_float()?;
                let lhs = self.stack.pop_float()?;
                self.stack.push_int(compare(lhs, rhs, 1));
            }
            opcode::DCMPL => {
                let rhs = self.stack.pop_double()?;
                let lhs = self.stack.pop_double()?;
                self.stack.push_int(compare(lhs, rhs, -1));
            }
            opcode::DCMPG => {
                let rhs = self.stack.pop_double()?;
                let lhs = self.stack.pop_double()?;
                self.stack.push_int(compare(lhs, rhs, 1));
            }

            opcode::IFEQ => {
                let value = self.stack.pop_int()?;
                self.branch_if(at, value == 0)?;
            }
            opcode::IFNE => {
                let value = self.stack.pop_int()?;
                self.branch_if(at, value != 0)?;
            }
            opcode::IFLT => {
                let value = self.stack.pop_int()?;
                self.branch_if(at, value < 0)?;
            }
            opcode::IFGE => {
                let value = self.stack.pop_int()?;
                self.branch_if(at, value >= 0)?;
            }
            opcode::IFGT => {
                let value = self.stack.pop_int()?;
                self.branch_if(at, value > 0)?;
            }
            opcode::IFLE => {
                let value = self.stack.pop_int()?;
                self.branch_if(at, value <= 0)?;
            }
            opcode::IF_ICMPEQ => {
                let (lhs, rhs) = self.pop_int_pair()?;
                self.branch_if(at, lhs == rhs)?;
            }
            opcode::IF_ICMPNE => {
                let (lhs, rhs) = self.pop_int_pair()?;
                self.branch_if(at, lhs != rhs)?;
            }
            opcode::IF_ICMPLT => {
                let (lhs, rhs) = self.pop_int_pair()?;
                self.branch_if(at, lhs < rhs)?;
            }
            opcode::IF_ICMPGE => {
                let (lhs, rhs) = self.pop_int_pair()?;
                self.branch_if(at, lhs >= rhs)?;
            }
            opcode::IF_ICMPGT => {
                let (lhs, rhs) = self.pop_int_pair()?;
                self.branch_if(at, lhs > rhs)?;
            }
            opcode::IF_ICMPLE => {
                let (lhs, rhs) = self.pop_int_pair()?;
                self.branch_if(at, lhs <= rhs)?;
            }
            opcode::IF_ACMPEQ => {
                let rhs = self.stack.pop_reference()?;
                let lhs = self.stack.pop_reference()?;
                self.branch_if(at, lhs == rhs)?;
            }
            opcode::IF_ACMPNE => {
                let rhs = self.stack.pop_reference()?;
                let lhs = self.stack.pop_reference()?;
                self.branch_if(at, lhs != rhs)?;
            }

            opcode::GOTO => self.branch_if(at, true)?,
            opcode::JSR => {
                let offset = self.fetch_i16()?;
                self.stack.push_slot(self.pc);
                self.jump(at, offset.into())?;
            }
            opcode::RET => {
                let index = u16::from(self.fetch_u1()?);
                self.pc = self.locals.get(index)?;
            }
            opcode::TABLESWITCH => return Err(Error::UnimplementedOpcode("tableswitch")),
            opcode::LOOKUPSWITCH => return Err(Error::UnimplementedOpcode("lookupswitch")),

            other => return Err(Error::UnknownOpcode { opcode: other, pc: at }),
        }
        Ok(())
    }

    fn ldc(&mut self, index: u16) -> Result<(), Error> {
        match self.constants.get_entry(index)? {
            Entry::Integer(value) => self.stack.push_int(*value),
            Entry::Float(value) => self.stack.push_float(*value),
            other => return Err(Error::UnsupportedLdcKind(other.kind())),
        }
        Ok(())
    }

    fn load(&mut self, index: u16) -> Result<(), Error> {
        let slot = self.locals.get(index)?;
        self.stack.push_slot(slot);
        Ok(())
    }

    fn load2(&mut self, index: u16) -> Result<(), Error> {
        let high = self.locals.get(index)?;
        let low = self.locals.get(index + 1)?;
        self.stack.push_slot(high);
        self.stack.push_slot(low);
        Ok(())
    }

    fn store(&mut self, index: u16) -> Result<(), Error> {
        let slot = self.stack.pop_slot()?;
        self.locals.set(index, slot)
    }

    fn store2(&mut self, index: u16) -> Result<(), Error> {
        let low = self.stack.pop_slot()?;
        let high = self.stack.pop_slot()?;
        self.locals.set(index, high)?;
        self.locals.set(index + 1, low)
    }

    fn array_load(&mut self, heap: &Heap, wide: bool) -> Result<(), Error> {
        let index = self.stack.pop_int()? as u32;
        let reference = self.stack.pop_reference()?;
        let value = heap.array(reference)?.get(index);
        if wide {
            self.stack.push_long(value as i64);
        } else {
            self.stack.push_slot(value as u32);
        }
        Ok(())
    }

    fn array_store(&mut self, heap: &mut Heap, wide: bool) -> Result<(), Error> {
        let value = if wide {
            self.stack.pop_long()? as u64
        } else {
            u64::from(self.stack.pop_slot()?)
        };
        let index = self.stack.pop_int()? as u32;
        let reference = self.stack.pop_reference()?;
        heap.array_mut(reference)?.set(index, value);
        Ok(())
    }

    fn int_binop(&mut self, op: impl FnOnce(i32, i32) -> i32) -> Result<(), Error> {
        let rhs = self.stack.pop_int()?;
        let lhs = self.stack.pop_int()?;
        self.stack.push_int(op(lhs, rhs));
        Ok(())
    }

    fn long_binop(&mut self, op: impl FnOnce(i64, i64) -> i64) -> Result<(), Error> {
        let rhs = self.stack.pop_long()?;
        let lhs = self.stack.pop_long()?;
        self.stack.push_long(op(lhs, rhs));
        Ok(())
    }

    fn float_binop(&mut self, op: impl FnOnce(f32, f32) -> f32) -> Result<(), Error> {
        let rhs = self.stack.pop_float()?;
        let lhs = self.stack.pop_float()?;
        self.stack.push_float(op(lhs, rhs));
        Ok(())
    }

    fn double_binop(&mut self, op: impl FnOnce(f64, f64) -> f64) -> Result<(), Error> {
        let rhs = self.stack.pop_double()?;
        let lhs = self.stack.pop_double()?;
        self.stack.push_double(op(lhs, rhs));
        Ok(())
    }

    fn pop_int_pair(&mut self) -> Result<(i32, i32), Error> {
        let rhs = self.stack.pop_int()?;
        let lhs = self.stack.pop_int()?;
        Ok((lhs, rhs))
    }

    /// Reads a signed 16-bit offset and branches relative to the opcode's
    /// own address when `taken`; falls through past the operand otherwise.
    fn branch_if(&mut self, at: u32, taken: bool) -> Result<(), Error> {
        let offset = self.fetch_i16()?;
        if taken {
            self.jump(at, offset.into())?;
        }
        Ok(())
    }

    fn jump(&mut self, at: u32, offset: i32) -> Result<(), Error> {
        let target = i64::from(at) + i64::from(offset);
        self.pc = u32::try_from(target).map_err(|_| Error::InvalidJumpTarget { pc: at, offset })?;
        Ok(())
    }

    fn fetch_u1(&mut self) -> Result<u8, Error> {
        let byte = self
            .code
            .bytecode
            .get(self.pc as usize)
            .copied()
            .ok_or(Error::TruncatedInstruction(self.pc))?;
        self.pc += 1;
        Ok(byte)
    }

    fn fetch_u2(&mut self) -> Result<u16, Error> {
        let high = self.fetch_u1()?;
        let low = self.fetch_u1()?;
        Ok(u16::from_be_bytes([high, low]))
    }

    fn fetch_i16(&mut self) -> Result<i16, Error> {
        Ok(self.fetch_u2()? as i16)
    }
}

/// Pushes -1/0/1 ordering with an explicit result for unordered operands.
fn compare<T: PartialOrd>(lhs: T, rhs: T, unordered: i32) -> i32 {
    match lhs.partial_cmp(&rhs) {
        Some(std::cmp::Ordering::Less) => -1,
        Some(std::cmp::Ordering::Equal) => 0,
        Some(std::cmp::Ordering::Greater) => 1,
        None => unordered,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::jvm::class::{
        MemberPool,
        constant_pool::tests::{parse_pool, utf8_entry},
    };

    /// Builds a pool and a single static method whose `Code` attribute
    /// wraps the given bytecode. Extra pool entries land after the three
    /// bookkeeping strings, so the first one gets index 4.
    fn method_with_code(
        max_stack: u16,
        max_locals: u16,
        bytecode: &[u8],
        extra_entries: &[Vec<u8>],
    ) -> (ConstantPool, MemberPool) {
        let mut entries = vec![utf8_entry("Code"), utf8_entry("run"), utf8_entry("()V")];
        entries.extend_from_slice(extra_entries);
        let pool = parse_pool(&entries);

        let mut body = Vec::new();
        body.extend(max_stack.to_be_bytes());
        body.extend(max_locals.to_be_bytes());
        body.extend(u32::try_from(bytecode.len()).unwrap().to_be_bytes());
        body.extend(bytecode);
        body.extend(0u16.to_be_bytes());
        body.extend(0u16.to_be_bytes());

        let mut bytes = 1u16.to_be_bytes().to_vec();
        bytes.extend(0x0008u16.to_be_bytes());
        bytes.extend(2u16.to_be_bytes());
        bytes.extend(3u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(1u16.to_be_bytes());
        bytes.extend(u32::try_from(body.len()).unwrap().to_be_bytes());
        bytes.extend(body);

        let members = MemberPool::from_reader(&mut bytes.as_slice(), &pool).unwrap();
        (pool, members)
    }

    fn run_with_heap(bytecode: &[u8], heap: &mut Heap) -> Result<Vec<u32>, Error> {
        let (pool, members) = method_with_code(8, 8, bytecode, &[]);
        let mut frame = Frame::new(&pool, members.get(0).unwrap()).unwrap();
        frame.run(heap)?;
        Ok(frame.stack().slots().to_vec())
    }

    fn run(bytecode: &[u8]) -> Result<Vec<u32>, Error> {
        run_with_heap(bytecode, &mut Heap::default())
    }

    fn run_expect_int(bytecode: &[u8]) -> i32 {
        let slots = run(bytecode).unwrap();
        (*slots.last().expect("stack should not be empty")) as i32
    }

    #[test]
    fn iconst_iadd_leaves_the_sum() {
        // iconst_2; iconst_3; iadd
        assert_eq!(run_expect_int(&[0x05, 0x06, 0x60]), 5);
    }

    #[test]
    fn icmpne_branch_skips_past_the_three_push() {
        // iconst_1; iconst_0; if_icmpne +7; iconst_3; goto +3; iconst_4
        // The comparison holds (1 != 0), so the branch jumps over the
        // 3-push and the final value is 4.
        let code = [0x04, 0x03, 0xA0, 0x00, 0x07, 0x06, 0xA7, 0x00, 0x03, 0x07];
        assert_eq!(run_expect_int(&code), 4);
    }

    #[test]
    fn goto_with_offset_three_is_sequential() {
        // goto +3 lands exactly on the next instruction.
        let code = [0xA7, 0x00, 0x03, 0x04];
        assert_eq!(run(&code).unwrap(), vec![1]);
    }

    #[test]
    fn branch_offsets_are_relative_to_the_branch_opcode() {
        // iconst_0; ifeq +4; nop; iconst_2  -- the branch at pc 1 must land
        // on pc 5, skipping the nop but not the final push.
        let code = [0x03, 0x99, 0x00, 0x04, 0x00, 0x05];
        assert_eq!(run(&code).unwrap(), vec![2]);
    }

    #[test]
    fn backward_branches_work() {
        // iconst_0; istore_0; iinc 0, 1; iload_0; iconst_5; if_icmplt -5
        // counts local 0 up to 5.
        let code = [0x03, 0x3B, 0x84, 0x00, 0x01, 0x1A, 0x08, 0xA1, 0xFF, 0xFB];
        let (pool, members) = method_with_code(8, 2, &code, &[]);
        let mut frame = Frame::new(&pool, members.get(0).unwrap()).unwrap();
        frame.run(&mut Heap::default()).unwrap();
        assert_eq!(frame.locals().get(0).unwrap(), 5);
        assert!(frame.stack().slots().is_empty());
    }

    #[test]
    fn bipush_and_sipush_sign_extend() {
        assert_eq!(run_expect_int(&[0x10, 0xFB]), -5);
        assert_eq!(run_expect_int(&[0x11, 0xFF, 0x00]), -256);
    }

    #[test]
    fn long_round_trip_through_locals() {
        // lconst_1; lneg; lstore_0; lload_0
        let slots = run(&[0x0A, 0x75, 0x3F, 0x1E]).unwrap();
        let mut stack = OperandStack::default();
        stack.push_long(-1);
        assert_eq!(slots, stack.slots());
    }

    #[test]
    fn division_by_zero_is_reported() {
        assert!(matches!(
            run(&[0x05, 0x03, 0x6C]),
            Err(Error::DivisionByZero)
        ));
        assert!(matches!(
            run(&[0x0A, 0x09, 0x6D]),
            Err(Error::DivisionByZero)
        ));
        assert!(matches!(
            run(&[0x05, 0x03, 0x70]),
            Err(Error::DivisionByZero)
        ));
    }

    #[test]
    fn overflowing_int_arithmetic_wraps() {
        // ldc of Integer i32::MAX; iconst_1; iadd
        let entries = vec![{
            let mut bytes = vec![3u8];
            bytes.extend(i32::MAX.to_be_bytes());
            bytes
        }];
        let (pool, members) = method_with_code(4, 0, &[0x12, 0x04, 0x04, 0x60], &entries);
        let mut frame = Frame::new(&pool, members.get(0).unwrap()).unwrap();
        frame.run(&mut Heap::default()).unwrap();
        assert_eq!(frame.stack().slots(), [i32::MIN as u32]);
    }

    #[test]
    fn shift_counts_are_masked() {
        // iconst_1; bipush 33; ishl  == 1 << 1
        assert_eq!(run_expect_int(&[0x04, 0x10, 0x21, 0x78]), 2);
        // iconst_m1; bipush 31; iushr == 1
        assert_eq!(run_expect_int(&[0x02, 0x10, 0x1F, 0x7C]), 1);
        // lconst_1; bipush 65; lshl == 2 (as long)
        let slots = run(&[0x0A, 0x10, 0x41, 0x79]).unwrap();
        let mut expected = OperandStack::default();
        expected.push_long(2);
        assert_eq!(slots, expected.slots());
    }

    #[test]
    fn i2b_and_i2s_sign_extend_through_shifts() {
        // sipush 0x0180; i2b  -> -128
        assert_eq!(run_expect_int(&[0x11, 0x01, 0x80, 0x91]), -128);
        // ldc-free variant for i2s: sipush 0x7FFF; iconst_1; iadd; i2s -> -32768
        assert_eq!(run_expect_int(&[0x11, 0x7F, 0xFF, 0x04, 0x60, 0x93]), -32768);
    }

    #[test]
    fn fremainder_follows_fmod() {
        // fconst_2; fconst_2; fconst_1; fadd; frem  == 2.0 % 3.0 == 2.0
        let slots = run(&[0x0D, 0x0D, 0x0C, 0x62, 0x72]).unwrap();
        assert_eq!(slots, vec![2.0f32.to_bits()]);
    }

    #[test]
    fn lcmp_orders_longs() {
        // lconst_0; lconst_1; lcmp
        assert_eq!(run_expect_int(&[0x09, 0x0A, 0x94]), -1);
        // lconst_1; lconst_0; lcmp
        assert_eq!(run_expect_int(&[0x0A, 0x09, 0x94]), 1);
        // lconst_1; lconst_1; lcmp
        assert_eq!(run_expect_int(&[0x0A, 0x0A, 0x94]), 0);
    }

    #[test]
    fn nan_ordering_diverges_between_cmpl_and_cmpg() {
        // fconst_0; fconst_0; fdiv gives NaN; fconst_1 then fcmpl/fcmpg.
        let nan_then = |cmp: u8| {
            let code = [0x0B, 0x0B, 0x6E, 0x0C, cmp];
            run_expect_int(&code)
        };
        assert_eq!(nan_then(0x95), -1);
        assert_eq!(nan_then(0x96), 1);

        let dnan_then = |cmp: u8| {
            let code = [0x0E, 0x0E, 0x6F, 0x0F, cmp];
            run_expect_int(&code)
        };
        assert_eq!(dnan_then(0x97), -1);
        assert_eq!(dnan_then(0x98), 1);
    }

    #[test]
    fn float_to_int_conversions_saturate() {
        // fconst_0; fconst_0; fdiv; f2i  -- NaN converts to 0.
        assert_eq!(run_expect_int(&[0x0B, 0x0B, 0x6E, 0x8B]), 0);
        // iconst_m1; i2f; f2i round trip
        assert_eq!(run_expect_int(&[0x02, 0x86, 0x8B]), -1);
    }

    #[test]
    fn conversion_chain_preserves_value() {
        // iconst_5; i2l; l2d; d2i
        assert_eq!(run_expect_int(&[0x08, 0x85, 0x8A, 0x8E]), 5);
    }

    #[test]
    fn ldc_pushes_integers_and_floats() {
        let integer = {
            let mut bytes = vec![3u8];
            bytes.extend(42i32.to_be_bytes());
            bytes
        };
        let float = {
            let mut bytes = vec![4u8];
            bytes.extend(1.5f32.to_be_bytes());
            bytes
        };
        let (pool, members) = method_with_code(4, 0, &[0x12, 0x04, 0x12, 0x05], &[integer, float]);
        let mut frame = Frame::new(&pool, members.get(0).unwrap()).unwrap();
        frame.run(&mut Heap::default()).unwrap();
        assert_eq!(frame.stack().slots(), [42u32, 1.5f32.to_bits()]);
    }

    #[test]
    fn ldc_of_a_string_is_unsupported() {
        let string = {
            let mut bytes = vec![8u8];
            bytes.extend(1u16.to_be_bytes());
            bytes
        };
        let (pool, members) = method_with_code(4, 0, &[0x12, 0x04], &[string]);
        let mut frame = Frame::new(&pool, members.get(0).unwrap()).unwrap();
        let err = frame.run(&mut Heap::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedLdcKind("CONSTANT_String")
        ));
    }

    #[test]
    fn ldc2_w_pushes_wide_constants_high_half_first() {
        let long = {
            let mut bytes = vec![5u8];
            bytes.extend(0x0102_0304_0506_0708i64.to_be_bytes());
            bytes
        };
        let (pool, members) = method_with_code(4, 0, &[0x14, 0x00, 0x04], &[long]);
        let mut frame = Frame::new(&pool, members.get(0).unwrap()).unwrap();
        frame.run(&mut Heap::default()).unwrap();
        assert_eq!(frame.stack().slots(), [0x0102_0304u32, 0x0506_0708u32]);
    }

    #[test]
    fn jsr_pushes_the_return_address_and_ret_jumps_back() {
        // 0: jsr +7 -> 7    (pushes the return address 3)
        // 3: iconst_2
        // 4: goto +6 -> 10  (past the end; the frame terminates)
        // 7: astore_0       (stores the return address)
        // 8: ret 0          (jumps to 3)
        let code = [0xA8, 0x00, 0x07, 0x05, 0xA7, 0x00, 0x06, 0x4B, 0xA9, 0x00];
        assert_eq!(run_expect_int(&code), 2);
    }

    #[test]
    fn switches_are_reported_unimplemented() {
        assert!(matches!(
            run(&[0xAA]),
            Err(Error::UnimplementedOpcode("tableswitch"))
        ));
        assert!(matches!(
            run(&[0xAB]),
            Err(Error::UnimplementedOpcode("lookupswitch"))
        ));
    }

    #[test]
    fn unknown_opcodes_carry_their_address() {
        // `return` (0xB1) is outside the implemented families.
        let err = run(&[0x00, 0xB1]).unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownOpcode {
                opcode: 0xB1,
                pc: 1
            }
        ));
    }

    #[test]
    fn popping_an_empty_stack_underflows() {
        assert!(matches!(run(&[0x57]), Err(Error::StackUnderflow)));
        assert!(matches!(run(&[0x60]), Err(Error::StackUnderflow)));
    }

    #[test]
    fn local_access_past_max_locals_fails() {
        let (pool, members) = method_with_code(4, 1, &[0x1B], &[]);
        let mut frame = Frame::new(&pool, members.get(0).unwrap()).unwrap();
        let err = frame.run(&mut Heap::default()).unwrap_err();
        assert!(matches!(err, Error::LocalIndexOutOfRange(1)));
    }

    #[test]
    fn truncated_operand_is_reported() {
        assert!(matches!(
            run(&[0x10]),
            Err(Error::TruncatedInstruction(1))
        ));
    }

    #[test]
    fn dup_duplicates_the_top_slot() {
        let slots = run(&[0x05, 0x59]).unwrap();
        assert_eq!(slots, vec![2, 2]);
    }

    #[test]
    fn dup_x1_inserts_below_the_second_slot() {
        let slots = run(&[0x04, 0x05, 0x5A]).unwrap();
        assert_eq!(slots, vec![2, 1, 2]);
    }

    #[test]
    fn dup_x2_inserts_three_slots_down() {
        let slots = run(&[0x04, 0x05, 0x06, 0x5B]).unwrap();
        assert_eq!(slots, vec![3, 1, 2, 3]);
    }

    #[test]
    fn dup2_duplicates_a_slot_pair() {
        let slots = run(&[0x09, 0x5C]).unwrap();
        assert_eq!(slots, vec![0, 0, 0, 0]);
        let slots = run(&[0x04, 0x05, 0x5C]).unwrap();
        assert_eq!(slots, vec![1, 2, 1, 2]);
    }

    #[test]
    fn dup2_x1_and_x2_reorder_slot_groups() {
        let slots = run(&[0x04, 0x05, 0x06, 0x5D]).unwrap();
        assert_eq!(slots, vec![2, 3, 1, 2, 3]);
        let slots = run(&[0x04, 0x05, 0x06, 0x07, 0x5E]).unwrap();
        assert_eq!(slots, vec![3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn swap_exchanges_the_top_two_slots() {
        let slots = run(&[0x04, 0x05, 0x5F]).unwrap();
        assert_eq!(slots, vec![2, 1]);
    }

    #[test]
    fn pop2_removes_a_slot_pair() {
        let slots = run(&[0x04, 0x09, 0x58]).unwrap();
        assert_eq!(slots, vec![1]);
    }

    #[test]
    fn aconst_null_pushes_the_null_reference() {
        assert_eq!(run(&[0x01]).unwrap(), vec![0]);
    }

    #[test]
    fn acmp_branches_compare_references() {
        // aconst_null; aconst_null; if_acmpeq +7; iconst_3; goto +3; iconst_4
        let code = [0x01, 0x01, 0xA5, 0x00, 0x07, 0x06, 0xA7, 0x00, 0x03, 0x07];
        assert_eq!(run_expect_int(&code), 4);
    }

    #[test]
    fn array_loads_pop_index_then_reference() {
        let mut heap = Heap::default();
        let reference = heap.alloc_array(3);
        assert_eq!(reference, 1);
        heap.array_mut(reference).unwrap().set(0, 42);
        // iconst_1 (ref); iconst_0 (index); iaload
        let slots = run_with_heap(&[0x04, 0x03, 0x2E], &mut heap).unwrap();
        assert_eq!(slots, vec![42]);
    }

    #[test]
    fn array_stores_pop_value_index_then_reference() {
        let mut heap = Heap::default();
        let reference = heap.alloc_array(3);
        // iconst_1 (ref); iconst_0 (index); bipush 42 (value); iastore
        run_with_heap(&[0x04, 0x03, 0x10, 0x2A, 0x4F], &mut heap).unwrap();
        assert_eq!(heap.array(reference).unwrap().get(0), 42);
    }

    #[test]
    fn wide_array_ops_move_full_64_bit_values() {
        let mut heap = Heap::default();
        let reference = heap.alloc_array(2);
        heap.array_mut(reference)
            .unwrap()
            .set(1, 0x0102_0304_0506_0708);
        // iconst_1 (ref); iconst_1 (index); laload; lstore_0; lload_0
        let slots = run_with_heap(&[0x04, 0x04, 0x2F, 0x3F, 0x1E], &mut heap).unwrap();
        assert_eq!(slots, vec![0x0102_0304, 0x0506_0708]);
    }

    #[test]
    fn out_of_range_array_reads_yield_zero() {
        let mut heap = Heap::default();
        heap.alloc_array(1);
        // iconst_1 (ref); iconst_5 (index); iaload
        let slots = run_with_heap(&[0x04, 0x08, 0x2E], &mut heap).unwrap();
        assert_eq!(slots, vec![0]);
    }

    #[test]
    fn dangling_array_references_are_reported() {
        let err = run(&[0x05, 0x03, 0x2E]).unwrap_err();
        assert!(matches!(err, Error::UnknownReference(2)));
    }

    proptest! {

        #[test]
        fn long_stack_round_trip(value in any::<i64>()) {
            let mut stack = OperandStack::new();
            stack.push_long(value);
            prop_assert_eq!(stack.depth(), 2);
            prop_assert_eq!(stack.pop_long().unwrap(), value);
        }

        #[test]
        fn double_stack_round_trip(bits in any::<u64>()) {
            let mut stack = OperandStack::new();
            stack.push_double(f64::from_bits(bits));
            prop_assert_eq!(stack.pop_double().unwrap().to_bits(), bits);
        }

        #[test]
        fn float_stack_round_trip(bits in any::<u32>()) {
            let mut stack = OperandStack::new();
            stack.push_float(f32::from_bits(bits));
            prop_assert_eq!(stack.pop_float().unwrap().to_bits(), bits);
        }

        #[test]
        fn wide_values_interleave_with_narrow_ones(
            wide in any::<i64>(),
            narrow in any::<i32>()
        ) {
            let mut stack = OperandStack::new();
            stack.push_long(wide);
            stack.push_int(narrow);
            prop_assert_eq!(stack.pop_int().unwrap(), narrow);
            prop_assert_eq!(stack.pop_long().unwrap(), wide);
        }

        #[test]
        fn dup_leaves_bitwise_equal_slots(value in any::<u32>()) {
            let mut stack = OperandStack::new();
            stack.push_slot(value);
            let popped = stack.pop_slot().unwrap();
            stack.push_slot(popped);
            stack.push_slot(popped);
            let top = stack.pop_slot().unwrap();
            let below = stack.pop_slot().unwrap();
            prop_assert_eq!(top, below);
            prop_assert_eq!(top, value);
        }
    }
}
