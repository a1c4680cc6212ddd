#![deny(meta_variable_misuse)]

/// Renders a doc-comment link into the JVM specification.
macro_rules! see_jvm_spec {
    ($chapter:literal $(, $section:literal)*) => {
        concat!(
            "See the [JVM specification §",
            stringify!($chapter) $(, ".", stringify!($section))*,
            "](https://docs.oracle.com/javase/specs/jvms/se8/html/jvms-",
            stringify!($chapter),
            ".html) for more information."
        )
    };
}

pub(crate) use see_jvm_spec;
