macro_rules! conditional_pub {
    (fn $name:ident $($rest:tt)*) => {
        #[cfg(not(feature = "hide_verification"))]
        pub fn $name $($rest)*

        #[cfg(feature = "hide_verification")]
        fn $name $($rest)*
    };
}

#[cfg(feature = "c001")]
pub mod longest_path;
#[cfg(feature = "c001")]
pub use longest_path as c001;
