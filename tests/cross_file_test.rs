// Handler and struct resolution stay inside the file that registers the route
use go_openapi_from_source::classifier::ParameterLocation;
use go_openapi_from_source::coordinator::Coordinator;
use go_openapi_from_source::parser::GoParser;
use go_openapi_from_source::type_resolver::{StructLookup, TypeResolver};
use pretty_assertions::assert_eq;
use std::path::Path;
use tempfile::TempDir;

const HANDLERS_GO: &str = r#"
package api

import "github.com/gin-gonic/gin"

type CreateOrderRequest struct {
    Item     string `json:"item" binding:"required"`
    Quantity int    `json:"quantity"`
}

func ListOrders(c *gin.Context) {
    status := c.Query("status")
    _ = status
}
"#;

const ROUTES_GO: &str = r#"
package api

import "github.com/gin-gonic/gin"

func Register(r *gin.Engine) {
    r.GET("/orders", ListOrders)
    r.POST("/orders", CreateOrder)
}

func CreateOrder(c *gin.Context, req CreateOrderRequest) {}
"#;

fn project() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp directory");
    std::fs::write(dir.path().join("handlers.go"), HANDLERS_GO).unwrap();
    std::fs::write(dir.path().join("routes.go"), ROUTES_GO).unwrap();
    dir
}

#[test]
fn test_handler_in_other_file_is_unresolved() {
    let dir = project();
    let api = Coordinator::new().unwrap().analyze_api(dir.path()).unwrap();

    assert_eq!(api.files_analyzed, 2);
    assert_eq!(api.routes.len(), 2);

    let list = &api.routes[0];
    assert_eq!(list.route.url_template, "/orders");
    assert!(
        list.handler.is_none(),
        "ListOrders is declared in handlers.go, not in the registering file"
    );
}

#[test]
fn test_struct_in_other_file_is_not_expanded() {
    let dir = project();
    let api = Coordinator::new().unwrap().analyze_api(dir.path()).unwrap();

    let create = api.routes[1].handler.as_ref().expect("CreateOrder is in routes.go");
    assert_eq!(create.parameters.len(), 2);

    let req = &create.parameters[1];
    assert_eq!(req.type_name, "CreateOrderRequest");
    assert_eq!(req.location, ParameterLocation::Body);
    assert!(req.sub_parameters.is_empty());
}

#[test]
fn test_type_resolver_lookup_outcomes() {
    assert!(!TypeResolver::CROSS_FILE_RESOLUTION);

    let mut parser = GoParser::new().unwrap();
    let routes = parser
        .parse_source(Path::new("routes.go"), ROUTES_GO.as_bytes().to_vec())
        .unwrap();
    let handlers = parser
        .parse_source(Path::new("handlers.go"), HANDLERS_GO.as_bytes().to_vec())
        .unwrap();

    let mut in_routes = TypeResolver::new(&routes);
    assert_eq!(in_routes.find_struct("CreateOrderRequest"), StructLookup::NotInFile);
    assert_eq!(
        in_routes.find_struct("models.CreateOrderRequest"),
        StructLookup::CrossFileUnsupported
    );

    let mut in_handlers = TypeResolver::new(&handlers);
    match in_handlers.find_struct("*CreateOrderRequest") {
        StructLookup::Found(def) => {
            let names: Vec<&str> = def.fields.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["Item", "Quantity"]);
        }
        other => panic!("expected the struct to be found, got {:?}", other),
    }
}
