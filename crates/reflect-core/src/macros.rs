//! Declarative registration of reflected structs.

/// Implement [`Reflect`](crate::Reflect) and
/// [`ReflectStruct`](crate::ReflectStruct) for a plain struct.
///
/// Every field is listed with its type, optionally followed by:
///
/// - `=> "key"` - JSON key (defaults to the field name; `"-"` skips encoding)
/// - `as "name"` - name used to pair fields during conversion
/// - `[flatten]` - promote the fields of an embedded struct
///
/// The struct must be `Clone + Default + Send + Sync + 'static`.
///
/// ```rust
/// use reflect_core::{impl_reflect_struct, NullTime, Timestamp};
///
/// #[derive(Debug, Clone, Default)]
/// pub struct Audit {
///     pub created_at: Timestamp,
///     pub deleted_at: NullTime,
/// }
///
/// impl_reflect_struct!(Audit {
///     created_at: Timestamp => "createTime" as "create_time",
///     deleted_at: NullTime => "-" as "delete_time",
/// });
/// ```
#[macro_export]
macro_rules! impl_reflect_struct {
    ($name:ident { $( $field:ident : $fty:ty $(=> $json:literal)? $(as $copy:literal)? $([$flag:ident])? ),* $(,)? }) => {
        impl $crate::Reflect for $name {
            fn shape() -> $crate::TypeShape {
                static FIELDS: &[$crate::FieldShape] = &[
                    $(
                        $crate::FieldShape {
                            name: stringify!($field),
                            json: $crate::__reflect_pick!(stringify!($field) $(, $json)?),
                            copy_name: $crate::__reflect_pick!(None $(, Some($copy))?),
                            flatten: $crate::__reflect_pick!(false $(, $crate::__reflect_flag!($flag))?),
                            shape: <$fty as $crate::Reflect>::shape,
                        },
                    )*
                ];
                $crate::TypeShape::new::<Self>($crate::ShapeKind::Struct(FIELDS))
            }

            $crate::__reflect_plumbing!();

            fn is_zero(&self) -> bool {
                true $( && $crate::Reflect::is_zero(&self.$field) )*
            }

            fn reflect_ref(&self) -> $crate::ReflectRef<'_> {
                $crate::ReflectRef::Struct(self)
            }

            fn reflect_mut(&mut self) -> $crate::ReflectMut<'_> {
                $crate::ReflectMut::Struct(self)
            }
        }

        impl $crate::ReflectStruct for $name {
            fn fields(&self) -> &'static [$crate::FieldShape] {
                <Self as $crate::Reflect>::shape().fields().unwrap_or(&[])
            }

            #[allow(unused_mut, unused_variables)]
            fn field_at(&self, index: usize) -> Option<&dyn $crate::Reflect> {
                let mut i = 0usize;
                $(
                    if index == i {
                        return Some(&self.$field);
                    }
                    i += 1;
                )*
                let _ = i;
                None
            }

            #[allow(unused_mut, unused_variables)]
            fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn $crate::Reflect> {
                let mut i = 0usize;
                $(
                    if index == i {
                        return Some(&mut self.$field);
                    }
                    i += 1;
                )*
                let _ = i;
                None
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_pick {
    ($default:expr) => {
        $default
    };
    ($default:expr, $override:expr) => {
        $override
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_flag {
    (flatten) => {
        true
    };
}

/// Shared `Reflect` methods that only depend on `Self: Clone`.
#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_plumbing {
    () => {
        fn type_shape(&self) -> $crate::TypeShape {
            <Self as $crate::Reflect>::shape()
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn into_any(self: Box<Self>) -> Box<dyn ::std::any::Any> {
            self
        }

        fn clone_value(&self) -> Box<dyn $crate::Reflect> {
            Box::new(::std::clone::Clone::clone(self))
        }

        fn assign(
            &mut self,
            value: Box<dyn $crate::Reflect>,
        ) -> ::std::result::Result<(), Box<dyn $crate::Reflect>> {
            if !value.as_any().is::<Self>() {
                return Err(value);
            }
            if let Ok(value) = value.into_any().downcast::<Self>() {
                *self = *value;
            }
            Ok(())
        }
    };
}
