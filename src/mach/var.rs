use super::Val;
use crate::error;
use crate::lang::{Error, Ident};
use std::convert::TryFrom;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    String,
    Integer,
    Float,
}

impl ElementType {
    pub fn zero(self) -> Val {
        match self {
            ElementType::String => Val::String(String::new()),
            ElementType::Integer => Val::Integer(0),
            ElementType::Float => Val::Float(0.0),
        }
    }

    /// Converts a value for storage in a cell of this type.
    pub fn coerce(self, value: Val) -> Result<Val> {
        match (self, value) {
            (ElementType::String, v @ Val::String(_)) => Ok(v),
            (ElementType::String, _) => Err(error!(TypeMismatch; "EXPECTED A STRING")),
            (_, Val::String(_)) => Err(error!(TypeMismatch; "EXPECTED A NUMBER")),
            (ElementType::Integer, v) => Ok(Val::Integer(i64::try_from(v)?)),
            (ElementType::Float, v) => Ok(Val::Float(f64::try_from(v)?)),
        }
    }
}

/// ## Typed variable storage
///
/// The sigil of the name picks the element type once. Storage is flat and
/// row-major, one element until `DIM` says otherwise.

#[derive(Debug, Clone)]
pub struct Var {
    name: Rc<str>,
    element_type: ElementType,
    dimensions: Vec<i64>,
    storage: Vec<Val>,
}

impl Var {
    pub fn new(ident: &Ident) -> Result<Var> {
        let element_type = match ident {
            Ident::String(_) => ElementType::String,
            Ident::Integer(_) => ElementType::Integer,
            Ident::Float(_) => ElementType::Float,
            Ident::Plain(name) => return Err(error!(UndefinedIdentifier; name)),
        };
        Ok(Var {
            name: ident.name().clone(),
            element_type,
            dimensions: vec![1],
            storage: vec![element_type.zero()],
        })
    }

    pub fn name(&self) -> &Rc<str> {
        &self.name
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn dimensions(&self) -> &[i64] {
        &self.dimensions
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Replaces the storage with zeroed cells.
    pub fn dimension(&mut self, dimensions: Vec<i64>) -> Result<()> {
        if dimensions.is_empty() {
            return Err(error!(IllegalQuantity; "NO DIMENSIONS"));
        }
        let mut size: usize = 1;
        for d in dimensions.iter() {
            if *d <= 0 {
                return Err(error!(IllegalQuantity; &format!("DIMENSION {} IS NOT POSITIVE", d)));
            }
            size = usize::try_from(*d)
                .ok()
                .and_then(|d| size.checked_mul(d))
                .ok_or_else(|| error!(OutOfMemory; "ARRAY TOO LARGE"))?;
        }
        if size > u16::max_value() as usize * 16 {
            return Err(error!(OutOfMemory; "ARRAY TOO LARGE"));
        }
        self.storage = vec![self.element_type.zero(); size];
        self.dimensions = dimensions;
        Ok(())
    }

    /// Offset of a subscript vector in the flat storage, last dimension
    /// fastest. No subscripts addresses a single-element variable.
    pub fn flatten(&self, subscripts: &[i64]) -> Result<usize> {
        if subscripts.is_empty() {
            if self.storage.len() == 1 {
                return Ok(0);
            }
            return Err(error!(SubscriptOutOfRange; &format!("{} NEEDS SUBSCRIPTS", self.name)));
        }
        if subscripts.len() != self.dimensions.len() {
            return Err(error!(SubscriptOutOfRange; &format!(
                "{} HAS {} DIMENSIONS",
                self.name,
                self.dimensions.len()
            )));
        }
        let mut index: usize = 0;
        for (s, d) in subscripts.iter().zip(self.dimensions.iter()) {
            if *s < 0 || *s >= *d {
                return Err(error!(SubscriptOutOfRange; &format!("{} NOT IN 0 TO {}", s, d - 1)));
            }
            index = index * (*d as usize) + *s as usize;
        }
        Ok(index)
    }

    pub fn get(&self, subscripts: &[i64]) -> Result<&Val> {
        let index = self.flatten(subscripts)?;
        self.storage
            .get(index)
            .ok_or_else(|| error!(InternalError; "FLATTENED INDEX OUT OF STORAGE"))
    }

    /// The live cell, for handing out its address.
    pub fn get_mut(&mut self, subscripts: &[i64]) -> Result<&mut Val> {
        let index = self.flatten(subscripts)?;
        self.storage
            .get_mut(index)
            .ok_or_else(|| error!(InternalError; "FLATTENED INDEX OUT OF STORAGE"))
    }

    pub fn assign(&mut self, subscripts: &[i64], value: Val) -> Result<()> {
        let index = self.flatten(subscripts)?;
        let value = self.element_type.coerce(value)?;
        match self.storage.get_mut(index) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(error!(InternalError; "FLATTENED INDEX OUT OF STORAGE")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(name: &str, dims: Vec<i64>) -> Var {
        let mut var = Var::new(&Ident::from_name(name)).unwrap();
        var.dimension(dims).unwrap();
        var
    }

    #[test]
    fn test_flatten_is_injective_and_in_range() {
        for dims in vec![vec![4], vec![2, 3], vec![3, 1, 2], vec![2, 2, 2, 2]] {
            let var = array("A#", dims.clone());
            let size: i64 = dims.iter().product();
            let mut seen = vec![false; size as usize];
            let mut subs = vec![0i64; dims.len()];
            loop {
                let index = var.flatten(&subs).unwrap();
                assert!(index < size as usize);
                assert!(!seen[index]);
                seen[index] = true;
                let mut d = dims.len();
                loop {
                    if d == 0 {
                        break;
                    }
                    d -= 1;
                    subs[d] += 1;
                    if subs[d] < dims[d] {
                        break;
                    }
                    subs[d] = 0;
                }
                if subs.iter().all(|s| *s == 0) {
                    break;
                }
            }
            assert!(seen.iter().all(|s| *s));
        }
    }

    #[test]
    fn test_last_dimension_fastest() {
        let var = array("A%", vec![2, 3]);
        assert_eq!(var.flatten(&[0, 1]).unwrap(), 1);
        assert_eq!(var.flatten(&[1, 0]).unwrap(), 3);
        assert_eq!(var.flatten(&[1, 2]).unwrap(), 5);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let var = array("A#", vec![3, 2]);
        assert!(var.flatten(&[3, 0]).is_err());
        assert!(var.flatten(&[0, -1]).is_err());
        assert!(var.flatten(&[0]).is_err());
        assert!(var.get(&[]).is_err());
    }

    #[test]
    fn test_dimension_must_be_positive() {
        let mut var = Var::new(&Ident::from_name("A$")).unwrap();
        assert!(var.dimension(vec![3, 0]).is_err());
        assert_eq!(var.len(), 1);
    }

    #[test]
    fn test_assignment_coercion() {
        let mut i = Var::new(&Ident::from_name("I#")).unwrap();
        i.assign(&[], Val::Float(2.9)).unwrap();
        assert_eq!(i.get(&[]).unwrap(), &Val::Integer(2));
        let mut f = Var::new(&Ident::from_name("F%")).unwrap();
        f.assign(&[], Val::Integer(2)).unwrap();
        assert_eq!(f.get(&[]).unwrap(), &Val::Float(2.0));
        let mut s = Var::new(&Ident::from_name("S$")).unwrap();
        assert!(s.assign(&[], Val::Integer(1)).is_err());
        assert!(i.assign(&[], Val::String("1".into())).is_err());
    }

    #[test]
    fn test_plain_names_hold_no_value() {
        assert!(Var::new(&Ident::from_name("LOOP")).is_err());
    }
}
