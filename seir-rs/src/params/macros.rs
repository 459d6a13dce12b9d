/// Declare a record of optional, name-addressable parameters.
///
/// Every field is exposed under its SCREAMING_SNAKE_CASE name, which is the
/// name used in parameter files and in command line overrides. Number fields
/// hold `Option<Real>` and date fields hold `Option<Date>`.
#[macro_export]
macro_rules! named_params {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            numbers: { $($(#[$ndoc:meta])* $num:ident),* $(,)? }
            dates: { $($(#[$ddoc:meta])* $date:ident),* $(,)? }
        }
    ) => {
        paste! {
            $(#[$meta])*
            pub struct $name {
                $($(#[$ndoc])* pub $num: Option<Real>,)*
                $($(#[$ddoc])* pub $date: Option<Date>,)*
            }

            impl $name {
                /// Names of all parameters.
                pub const NAMES: &'static [&'static str] = &[
                    $(stringify!([<$num:upper>]),)*
                    $(stringify!([<$date:upper>]),)*
                ];

                /// Value of the named parameter, if set.
                pub fn get(&self, name: &str) -> Result<Option<ParamValue>> {
                    match name {
                        $(stringify!([<$num:upper>]) => Ok(self.$num.map(ParamValue::Number)),)*
                        $(stringify!([<$date:upper>]) => Ok(self.$date.map(ParamValue::Date)),)*
                        _ => Err(unknown_param(name)),
                    }
                }

                /// Set the named parameter. The value kind must match the
                /// parameter kind.
                pub fn set_param(&mut self, name: &str, value: ParamValue) -> Result<&mut Self> {
                    match (name, value) {
                        $((stringify!([<$num:upper>]), ParamValue::Number(x)) => self.$num = Some(x),)*
                        $((stringify!([<$date:upper>]), ParamValue::Date(d)) => self.$date = Some(d),)*
                        (name, value) if Self::NAMES.contains(&name) => {
                            return Err(ProjectionError::config(format!(
                                "wrong value kind for {}: {}", name, value
                            )));
                        }
                        (name, _) => return Err(unknown_param(name)),
                    }
                    Ok(self)
                }

                /// Set the named parameter from its textual representation,
                /// parsed according to the parameter kind.
                pub fn set_param_str(&mut self, name: &str, value: &str) -> Result<&mut Self> {
                    let bad = |e: &dyn std::fmt::Display| {
                        ProjectionError::config(format!("invalid value for {}: {:?} ({})", name, value, e))
                    };
                    match name {
                        $(stringify!([<$num:upper>]) => {
                            self.$num = Some(value.trim().parse::<Real>().map_err(|e| bad(&e))?);
                        })*
                        $(stringify!([<$date:upper>]) => {
                            self.$date = Some(value.trim().parse::<Date>().map_err(|e| bad(&e))?);
                        })*
                        _ => return Err(unknown_param(name)),
                    }
                    Ok(self)
                }

                /// Shift the named parameter by delta. Dates move by whole days.
                pub fn change_param(&mut self, name: &str, delta: Real) -> Result<&mut Self> {
                    let unset = || ProjectionError::config(format!("cannot change unset param {}", name));
                    match name {
                        $(stringify!([<$num:upper>]) => {
                            let old = self.$num.ok_or_else(unset)?;
                            self.$num = Some(old + delta);
                        })*
                        $(stringify!([<$date:upper>]) => {
                            let old = self.$date.ok_or_else(unset)?;
                            self.$date = Some(old + whole_days(name, delta)?);
                        })*
                        _ => return Err(unknown_param(name)),
                    }
                    Ok(self)
                }

                /// All parameters that are set, in declaration order.
                pub fn pairs(&self) -> Vec<(&'static str, ParamValue)> {
                    let mut out = Vec::new();
                    $(if let Some(x) = self.$num {
                        out.push((stringify!([<$num:upper>]), ParamValue::Number(x)));
                    })*
                    $(if let Some(d) = self.$date {
                        out.push((stringify!([<$date:upper>]), ParamValue::Date(d)));
                    })*
                    out
                }
            }
        }
    };
}
