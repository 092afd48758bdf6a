use crate::advice::{AdviceClient, GeminiClient};
use crate::config::AppConfig;
use crate::dishes::DishIndex;
use crate::meals::{JsonFileStore, LogStore};
use anyhow::Context;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub dishes: Arc<DishIndex>,
    pub log: Arc<dyn LogStore>,
    pub advisor: Arc<dyn AdviceClient>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let dishes = Arc::new(DishIndex::load(&config.dataset_path).context("load dataset")?);
        let log = Arc::new(JsonFileStore::new(&config.log_path)) as Arc<dyn LogStore>;

        if config.gemini.api_key.is_none() {
            warn!("no Gemini API key configured; advice requests will fall back");
        }
        let advisor = Arc::new(GeminiClient::new(config.gemini.clone())) as Arc<dyn AdviceClient>;

        info!(
            dataset = %config.dataset_path.display(),
            log = %config.log_path.display(),
            "state initialized"
        );
        Ok(Self::from_parts(config, dishes, log, advisor))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        dishes: Arc<DishIndex>,
        log: Arc<dyn LogStore>,
        advisor: Arc<dyn AdviceClient>,
    ) -> Self {
        Self {
            config,
            dishes,
            log,
            advisor,
        }
    }

    /// Small in-memory catalog, in-memory log and an advisor that answers
    /// with canned JSON. Nothing touches the file system or the network.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::advice::AdviceError;
        use crate::config::GeminiConfig;
        use crate::meals::MemoryStore;
        use async_trait::async_trait;

        struct FakeAdvisor;
        #[async_trait]
        impl AdviceClient for FakeAdvisor {
            async fn generate(&self, meals_summary: &str) -> Result<String, AdviceError> {
                Ok(serde_json::json!({
                    "summary": format!("You ate {} meals.", meals_summary.lines().count()),
                    "key_nutrients": ["Protein"],
                    "tips": "Add vegetables.",
                    "warnings": ""
                })
                .to_string())
            }
        }

        let csv = "Dish_Name,Calories,Carbohydrates,Protein,Fats,Free_Sugar,Fibre,Sodium,Calcium,Iron,VitaminC,Folate\n\
                   Paneer Tikka,250,8,18,15,1,2,400,300,1.5,4,20\n\
                   Dal Fry,180,20,10,6,,5,350,40,2.1,3,60\n";
        let dishes = DishIndex::from_reader(csv.as_bytes()).expect("fake catalog parses");

        let config = Arc::new(AppConfig {
            dataset_path: "fake.csv".into(),
            log_path: "fake.json".into(),
            gemini: GeminiConfig {
                api_key: None,
                model: "fake".into(),
                temperature: 0.3,
                base_url: "http://fake.local".into(),
            },
        });

        Self::from_parts(
            config,
            Arc::new(dishes),
            Arc::new(MemoryStore::default()),
            Arc::new(FakeAdvisor),
        )
    }

    #[cfg(test)]
    pub fn with_advisor(mut self, advisor: Arc<dyn AdviceClient>) -> Self {
        self.advisor = advisor;
        self
    }
}
