#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use vellum_core::{AllocatorConfig, Vellum};
use vellum_db::Database;
use vellum_types::models::{GroupId, Role, Template, UserId};

pub struct World {
    pub db: Arc<Database>,
    pub vellum: Vellum,
    pub admin: UserId,
    pub group: GroupId,
}

impl World {
    pub fn in_memory() -> Self {
        Self::with_db(Database::open_in_memory().unwrap(), AllocatorConfig::default())
    }

    pub fn with_db(db: Database, config: AllocatorConfig) -> Self {
        let db = Arc::new(db);
        let vellum = Vellum::new(db.clone(), config);
        let admin = vellum
            .register_user("admin@example.com", "$argon2id$fake", "Admin")
            .unwrap()
            .id;
        let group = vellum.create_group("G", None, &admin).unwrap().id;
        Self {
            db,
            vellum,
            admin,
            group,
        }
    }

    pub fn member(&self, email: &str, role: Role) -> UserId {
        let user = self
            .vellum
            .register_user(email, "$argon2id$fake", email)
            .unwrap()
            .id;
        self.vellum
            .add_member(&self.group, &user, role, &self.admin)
            .unwrap();
        user
    }

    pub fn template(&self, author: &UserId) -> Template {
        self.vellum
            .create_template(&self.group, "Welcome", Some("Onboarding email"), author)
            .unwrap()
    }
}

/// Retry budget large enough that contention in tests never exhausts it.
pub fn patient_config() -> AllocatorConfig {
    AllocatorConfig {
        max_attempts: 500,
        base_backoff: Duration::from_micros(50),
        max_backoff: Duration::from_millis(5),
    }
}
