use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    entities::recipe_line::{self, Entity as RecipeLineEntity},
    errors::ServiceError,
    models::{ItemRef, RecipeOwner},
    services::catalog::{require_menu, require_product, require_wip_item},
};

/// One input of a scaled recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requirement {
    pub input: ItemRef,
    pub required_quantity: Decimal,
    pub unit: String,
}

/// The recipe graph: which inputs, in what quantity, make one unit of a
/// menu or WIP item.
#[derive(Clone)]
pub struct RecipeService {
    db: Arc<DatabaseConnection>,
}

impl RecipeService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Adds an edge to the graph.
    ///
    /// Both ends must exist. A WIP input on a WIP recipe is rejected when the
    /// input already depends on the owner, which keeps the WIP chain acyclic.
    #[instrument(skip(self))]
    pub async fn add_line(
        &self,
        owner: RecipeOwner,
        input: ItemRef,
        quantity: Decimal,
        unit: &str,
    ) -> Result<recipe_line::Model, ServiceError> {
        if quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Recipe quantity must be positive".to_string(),
            ));
        }
        if unit.trim().is_empty() {
            return Err(ServiceError::ValidationError("Recipe unit is required".to_string()));
        }

        let db = self.db.as_ref();
        match &owner {
            RecipeOwner::Menu(id) => require_menu(db, id).await.map(|_| ())?,
            RecipeOwner::Wip(id) => require_wip_item(db, id).await.map(|_| ())?,
        }
        match &input {
            ItemRef::Product(id) => require_product(db, id).await.map(|_| ())?,
            ItemRef::Wip(id) => require_wip_item(db, id).await.map(|_| ())?,
        }

        if let (RecipeOwner::Wip(owner_id), ItemRef::Wip(input_id)) = (&owner, &input) {
            if owner_id == input_id {
                return Err(ServiceError::InvalidState(format!(
                    "WIP item {} cannot be an input of itself",
                    owner_id
                )));
            }
            if self.depends_on(db, input_id, owner_id).await? {
                return Err(ServiceError::InvalidState(format!(
                    "Adding {} to the recipe of {} would create a cycle",
                    input_id, owner_id
                )));
            }
        }

        let (menu_id, wip_item_id) = owner.clone().into_columns();
        let (product_id, used_wip_item_id) = input.clone().into_columns();
        let now = Utc::now();
        let line = recipe_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            menu_id: Set(menu_id),
            wip_item_id: Set(wip_item_id),
            product_id: Set(product_id),
            used_wip_item_id: Set(used_wip_item_id),
            quantity: Set(quantity),
            unit: Set(unit.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!("Failed to insert recipe line: {}", e);
            ServiceError::db_error(e)
        })?;

        info!(%owner, %input, %quantity, "Recipe line added");
        Ok(line)
    }

    #[instrument(skip(self))]
    pub async fn lines_for(&self, owner: &RecipeOwner) -> Result<Vec<recipe_line::Model>, ServiceError> {
        self.lines_in(self.db.as_ref(), owner).await
    }

    pub async fn lines_for_menu(&self, menu_id: &str) -> Result<Vec<recipe_line::Model>, ServiceError> {
        require_menu(self.db.as_ref(), menu_id).await?;
        self.lines_for(&RecipeOwner::Menu(menu_id.to_string())).await
    }

    /// Scales the direct inputs of `owner` by `batch`.
    ///
    /// One level only: WIP inputs are reported as WIP requirements and not
    /// broken down further. An empty recipe yields no requirements.
    #[instrument(skip(self))]
    pub async fn expand(
        &self,
        owner: &RecipeOwner,
        batch: Decimal,
    ) -> Result<Vec<Requirement>, ServiceError> {
        self.expand_in(self.db.as_ref(), owner, batch).await
    }

    pub(crate) async fn expand_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: &RecipeOwner,
        batch: Decimal,
    ) -> Result<Vec<Requirement>, ServiceError> {
        let lines = self.lines_in(conn, owner).await?;
        lines
            .into_iter()
            .map(|line| {
                Ok(Requirement {
                    input: line.input()?,
                    required_quantity: line.quantity * batch,
                    unit: line.unit,
                })
            })
            .collect()
    }

    /// Expands `owner` down to raw products.
    ///
    /// WIP inputs are replaced by their own recipes scaled by the required
    /// amount. Quantities of the same product are summed, in the order the
    /// product is first reached. Fails with `InvalidState` if stored recipes
    /// contain a cycle.
    #[instrument(skip(self))]
    pub async fn expand_transitive(
        &self,
        owner: &RecipeOwner,
        batch: Decimal,
    ) -> Result<Vec<Requirement>, ServiceError> {
        let db = self.db.as_ref();
        let mut totals: Vec<Requirement> = Vec::new();
        // (recipe to expand, multiplier, WIP ids on the path from the root)
        let mut queue: VecDeque<(RecipeOwner, Decimal, Vec<String>)> = VecDeque::new();
        let root_path = match owner {
            RecipeOwner::Wip(id) => vec![id.clone()],
            RecipeOwner::Menu(_) => Vec::new(),
        };
        queue.push_back((owner.clone(), batch, root_path));

        while let Some((current, multiplier, path)) = queue.pop_front() {
            for Requirement {
                input,
                required_quantity,
                unit,
            } in self.expand_in(db, &current, multiplier).await?
            {
                match input {
                    input @ ItemRef::Product(_) => {
                        if let Some(existing) = totals.iter_mut().find(|r| r.input == input) {
                            existing.required_quantity += required_quantity;
                        } else {
                            totals.push(Requirement {
                                input,
                                required_quantity,
                                unit,
                            });
                        }
                    }
                    ItemRef::Wip(wip_id) => {
                        if path.contains(&wip_id) {
                            return Err(ServiceError::InvalidState(format!(
                                "Recipe cycle through WIP item {}",
                                wip_id
                            )));
                        }
                        let mut next_path = path.clone();
                        next_path.push(wip_id.clone());
                        queue.push_back((RecipeOwner::Wip(wip_id), required_quantity, next_path));
                    }
                }
            }
        }

        Ok(totals)
    }

    async fn lines_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        owner: &RecipeOwner,
    ) -> Result<Vec<recipe_line::Model>, ServiceError> {
        let query = match owner {
            RecipeOwner::Menu(id) => {
                RecipeLineEntity::find().filter(recipe_line::Column::MenuId.eq(id.as_str()))
            }
            RecipeOwner::Wip(id) => {
                RecipeLineEntity::find().filter(recipe_line::Column::WipItemId.eq(id.as_str()))
            }
        };
        query
            .order_by_asc(recipe_line::Column::CreatedAt)
            .order_by_asc(recipe_line::Column::Id)
            .all(conn)
            .await
            .map_err(|e| {
                error!("Failed to fetch recipe lines for {}: {}", owner, e);
                ServiceError::db_error(e)
            })
    }

    /// True when `target` is reachable from `from` along WIP→WIP edges.
    async fn depends_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        from: &str,
        target: &str,
    ) -> Result<bool, ServiceError> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut pending = vec![from.to_string()];

        while let Some(current) = pending.pop() {
            if current == target {
                return Ok(true);
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            let inputs = RecipeLineEntity::find()
                .filter(recipe_line::Column::WipItemId.eq(current.as_str()))
                .filter(recipe_line::Column::UsedWipItemId.is_not_null())
                .all(conn)
                .await
                .map_err(ServiceError::db_error)?;
            pending.extend(inputs.into_iter().filter_map(|l| l.used_wip_item_id));
        }

        Ok(false)
    }
}
