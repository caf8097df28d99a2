//! Tuples and `Result`. Structs use [`crate::deep_copy_record!`].

use super::DeepCopy;
use crate::copy::CopyContext;
use crate::kind::EnumCopyKind;
use crate::spec::DeepCopyError;

macro_rules! impl_deep_copy_tuple {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: DeepCopy),+> DeepCopy for ($($name,)+) {
            const KIND: EnumCopyKind = EnumCopyKind::Record;

            fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
                Ok(($(ctx.copy(&self.$idx)?,)+))
            }

            fn copy_shell(&self) -> Result<Self, DeepCopyError> {
                Ok(($(self.$idx.copy_shell()?,)+))
            }
        }
    };
}

impl_deep_copy_tuple!(A.0);
impl_deep_copy_tuple!(A.0, B.1);
impl_deep_copy_tuple!(A.0, B.1, C.2);
impl_deep_copy_tuple!(A.0, B.1, C.2, D.3);
impl_deep_copy_tuple!(A.0, B.1, C.2, D.3, E.4);
impl_deep_copy_tuple!(A.0, B.1, C.2, D.3, E.4, F.5);
impl_deep_copy_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6);
impl_deep_copy_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);
impl_deep_copy_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8);
impl_deep_copy_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9);
impl_deep_copy_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10);
impl_deep_copy_tuple!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7, I.8, J.9, K.10, L.11);

impl<T: DeepCopy, E: DeepCopy> DeepCopy for Result<T, E> {
    const KIND: EnumCopyKind = EnumCopyKind::Record;

    fn deep_copy_in(&self, ctx: &mut CopyContext) -> Result<Self, DeepCopyError> {
        match self {
            Ok(value) => Ok(Ok(ctx.copy(value)?)),
            Err(err) => Ok(Err(ctx.copy(err)?)),
        }
    }

    fn copy_shell(&self) -> Result<Self, DeepCopyError> {
        match self {
            Ok(value) => Ok(Ok(value.copy_shell()?)),
            Err(err) => Ok(Err(err.copy_shell()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{DeepCopy, DeepCopyError, deep_copy, deep_copy_record};

    #[derive(Debug, PartialEq)]
    struct Pair {
        a: i32,
        b: f32,
    }
    deep_copy_record!(Pair { a, b });

    #[derive(Debug, PartialEq)]
    struct Complex64 {
        re: f32,
        im: f32,
    }
    deep_copy_record!(Complex64 { re, im });

    #[derive(Debug, PartialEq)]
    struct Inner {
        d: Complex64,
    }
    deep_copy_record!(Inner { d });

    #[derive(Debug, PartialEq)]
    struct Outer {
        a: i32,
        b: Vec<f32>,
        c: Inner,
        e: Option<Box<bool>>,
    }
    deep_copy_record!(Outer { a, b, c, e });

    #[derive(Debug, PartialEq)]
    struct Celsius(f64, String);
    deep_copy_record!(Celsius(0, 1));

    #[derive(Debug, PartialEq)]
    struct Marker;
    deep_copy_record!(Marker {});

    #[test]
    fn record_fields_are_copied_including_private_ones() {
        let pair = Pair { a: 5, b: 999.999 };
        assert_eq!(deep_copy(&pair).expect("pair"), pair);
    }

    #[test]
    fn nested_record_copy_is_equal_and_independent() {
        let outer = Outer {
            a: 5,
            b: vec![1.1, 2.2, 3.3, 4.4],
            c: Inner {
                d: Complex64 { re: 9.9, im: 8.8 },
            },
            e: Some(Box::new(true)),
        };

        let mut copied = deep_copy(&outer).expect("outer");
        assert_eq!(copied, outer);

        copied.b[0] = 0.0;
        if let Some(flag) = copied.e.as_mut() {
            **flag = false;
        }
        assert_eq!(outer.b[0], 1.1);
        assert_eq!(outer.e.as_deref(), Some(&true));
    }

    #[test]
    fn tuple_unit_and_result_records_copy() {
        assert_eq!(
            deep_copy(&Celsius(21.5, "room".to_string())).expect("tuple struct"),
            Celsius(21.5, "room".to_string())
        );
        assert_eq!(deep_copy(&Marker).expect("unit struct"), Marker);
        assert_eq!(deep_copy(&(1_u8, "x".to_string(), [2_i16; 3])).expect("tuple"), (1, "x".to_string(), [2; 3]));

        let ok: Result<Vec<u8>, String> = Ok(vec![1]);
        assert_eq!(deep_copy(&ok).expect("ok"), ok);
        let err: Result<Vec<u8>, String> = Err("bad".to_string());
        assert_eq!(deep_copy(&err).expect("err"), err);
    }

    #[test]
    fn record_shell_has_empty_containers() {
        let outer = Outer {
            a: 1,
            b: vec![1.0],
            c: Inner {
                d: Complex64 { re: 0.0, im: 1.0 },
            },
            e: Some(Box::new(true)),
        };
        let shell = outer.copy_shell().expect("shell");
        assert!(shell.b.is_empty());
        assert!(shell.e.is_none());
    }

    #[test]
    fn error_in_any_field_fails_the_whole_record() {
        struct WithReceiver {
            n: u8,
            rx: std::sync::mpsc::Receiver<()>,
        }
        deep_copy_record!(WithReceiver { n, rx });

        let (_tx, rx) = std::sync::mpsc::channel();
        let value = WithReceiver { n: 1, rx };
        let err = deep_copy(&value).err().expect("receiver field must fail");
        assert!(matches!(err, DeepCopyError::UnsupportedKind { .. }));
        assert_eq!(value.n, 1);
    }
}
