/// Build an [`ExperienceRegistry`](crate::runtime::registry::ExperienceRegistry)
/// from modules that each expose `EXPERIENCE_CONFIG` and
/// `init(&MountContext) -> impl Experience`. Tabs appear in the order given.
#[macro_export]
macro_rules! register_experiences {
    ($($module:ident),+ $(,)?) => {{
        (|| -> Result<$crate::runtime::registry::ExperienceRegistry, String> {
            let mut __registry =
                $crate::runtime::registry::ExperienceRegistry::new();

            $(
                __registry.register(
                    &$module::EXPERIENCE_CONFIG,
                    |ctx: &$crate::experience::MountContext| {
                        Box::new($module::init(ctx))
                    },
                )?;
            )+

            Ok(__registry)
        })()
    }};
}
