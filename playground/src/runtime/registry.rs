use super::tabs::Tab;
use crate::core::util::HashMap;
use crate::experience::{Experience, ExperienceConfig, MountContext};

type ExperienceFactory =
    Box<dyn Fn(&MountContext) -> Box<dyn Experience> + Send + Sync + 'static>;

pub struct ExperienceEntry {
    pub config: &'static ExperienceConfig,
    pub factory: ExperienceFactory,
}

#[derive(Default)]
pub struct ExperienceRegistry {
    entries: HashMap<Tab, ExperienceEntry>,
    ordered_tabs: Vec<Tab>,
}

impl ExperienceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(
        &mut self,
        config: &'static ExperienceConfig,
        factory: F,
    ) -> Result<(), String>
    where
        F: Fn(&MountContext) -> Box<dyn Experience> + Send + Sync + 'static,
    {
        if self.entries.contains_key(&config.tab) {
            return Err(format!(
                "duplicate experience registration: {}",
                config.tab.key()
            ));
        }

        self.ordered_tabs.push(config.tab);
        self.entries.insert(
            config.tab,
            ExperienceEntry {
                config,
                factory: Box::new(factory),
            },
        );

        Ok(())
    }

    pub fn get(&self, tab: Tab) -> Option<&ExperienceEntry> {
        self.entries.get(&tab)
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.ordered_tabs
    }

    pub fn first_tab(&self) -> Option<Tab> {
        self.ordered_tabs.first().copied()
    }

    /// The tab after `tab` in registration order, wrapping around
    pub fn next_tab(&self, tab: Tab) -> Option<Tab> {
        let index = self.ordered_tabs.iter().position(|t| *t == tab)?;
        self.ordered_tabs
            .get((index + 1) % self.ordered_tabs.len())
            .copied()
    }
}
