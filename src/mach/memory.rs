/*!
## Raw memory access

`PEEK`, `POKE`, `POINTER` and `POINTERVAR` work on integer addresses into
the interpreter's own process memory. This module is the only place the
machine touches raw pointers. Addresses handed out here stay valid only while
the variable they point into is neither redimensioned nor dropped.

*/

use super::{Val, Var};
use crate::error;
use crate::lang::Error;
use std::convert::TryFrom;

type Result<T> = std::result::Result<T, Error>;

/// Address of a whole variable.
pub fn address_of_var(var: &Var) -> i64 {
    var as *const Var as usize as i64
}

/// Address of the payload inside a storage cell.
pub fn cell_address(cell: &mut Val) -> i64 {
    match cell {
        Val::Integer(n) => n as *mut i64 as usize as i64,
        Val::Float(f) => f as *mut f64 as usize as i64,
        Val::String(s) => s.as_ptr() as usize as i64,
        Val::Boolean(b) => b as *mut bool as usize as i64,
    }
}

fn pointer(address: i64) -> Result<usize> {
    match usize::try_from(address) {
        Ok(0) | Err(_) => Err(error!(IllegalQuantity; "INVALID ADDRESS")),
        Ok(address) => Ok(address),
    }
}

/// Reads one byte.
///
/// # Safety
///
/// `address` must point at readable memory owned by this process, such as a
/// value returned by [`cell_address`] for a cell that is still alive.
pub unsafe fn peek(address: i64) -> Result<u8> {
    let ptr = pointer(address)? as *const u8;
    Ok(std::ptr::read_volatile(ptr))
}

/// Writes one byte.
///
/// # Safety
///
/// `address` must point at writable memory owned by this process, and the
/// byte written must leave the value there valid for its type.
pub unsafe fn poke(address: i64, byte: u8) -> Result<()> {
    let ptr = pointer(address)? as *mut u8;
    std::ptr::write_volatile(ptr, byte);
    Ok(())
}
