#[macro_export]
macro_rules! bootstrap {
    ($x:expr $( , $xs:expr )* $(,)?) => {
        eprintln!(concat!("[bootstrap] ", $x) $( , $xs )*)
    };
}

#[macro_export]
macro_rules! trace_catch {
    ($val:expr, $($rest:tt)*) => {
        if let Err(ref e) = $val {
            $crate::__private::tracing::error!(error = %e, $($rest)*);
        }
    };
}
