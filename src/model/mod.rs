pub mod attendance;
pub mod comp_off;
pub mod employee;
pub mod leave_request;
pub mod notification;
pub mod request;
pub mod role;
pub mod tenant;

/// Maps a strum text enum onto a MySQL VARCHAR column.
///
/// The enum must derive `AsRefStr` and `EnumString` with the same spelling.
macro_rules! text_column {
    ($ty:ty) => {
        impl $ty {
            pub fn as_str(&self) -> &str {
                self.as_ref()
            }
        }

        impl sqlx::Type<sqlx::MySql> for $ty {
            fn type_info() -> sqlx::mysql::MySqlTypeInfo {
                <str as sqlx::Type<sqlx::MySql>>::type_info()
            }

            fn compatible(ty: &sqlx::mysql::MySqlTypeInfo) -> bool {
                <str as sqlx::Type<sqlx::MySql>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::MySql> for $ty {
            fn encode_by_ref(&self, buf: &mut Vec<u8>) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<'q, sqlx::MySql>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::MySql> for $ty {
            fn decode(
                value: sqlx::mysql::MySqlValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let text = <&str as sqlx::Decode<'r, sqlx::MySql>>::decode(value)?;
                text.parse::<$ty>()
                    .map_err(|e| format!("invalid {} value {:?}: {}", stringify!($ty), text, e).into())
            }
        }
    };
}

pub(crate) use text_column;
