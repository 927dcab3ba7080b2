pub mod pages {
    use axum::response::Html;

    /// Base for every page controller: templates become routes.
    #[pageroute::controller(template_routes, abstract_controller)]
    pub struct PagesController;

    #[pageroute::controller(extends = PagesController)]
    pub struct HomeController;

    #[pageroute::controller(extends = PagesController)]
    pub struct BlogController;

    #[pageroute::routes]
    impl BlogController {
        #[get("/blog/feed")]
        pub async fn feed() -> Html<&'static str> {
            Html("<rss version=\"2.0\"><channel><title>Blog</title></channel></rss>")
        }
    }
}
