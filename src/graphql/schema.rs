use async_graphql::{EmptySubscription, Schema};

use crate::graphql::{MutationRoot, QueryRoot};

pub type ApiSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

const MAX_QUERY_DEPTH: usize = 12;

pub fn create_schema() -> ApiSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .limit_depth(MAX_QUERY_DEPTH)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_exposes_public_and_admin_roots() {
        let sdl = create_schema().sdl();
        assert!(sdl.contains("publishedProjects"));
        assert!(sdl.contains("updateProject"));
        assert!(sdl.contains("input UpdateProjectInput"));
    }
}
