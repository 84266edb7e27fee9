use super::{Project, ProjectColor};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The fixed project set shown when nothing has been persisted yet, in
/// authored order.
pub fn seed_projects() -> Vec<Project> {
    vec![
        Project::new("1", "VerifyDev")
            .with_subtitle("Developer Verification Platform")
            .with_description(
                "Architected 8-microservice platform (Auth, User, Job, Recruiter, Chat, Resume, \
                 Aura-Processor, Analyzer) with gRPC communication and RabbitMQ event-driven messaging.",
            )
            .with_tech(strings(&[
                "Go",
                "Node.js",
                "gRPC",
                "RabbitMQ",
                "Prisma",
                "React Native",
                "Next.js",
                "Socket.io",
            ]))
            .with_github("https://github.com/keshav-sudo/")
            .with_date("Dec 2025")
            .with_highlights(strings(&[
                "65% faster queries via Prisma indexes",
                "Real-time chat via Socket.io & gRPC streaming",
                "GitHub repo analysis with tech stack detection",
            ]))
            .with_color(ProjectColor::Purple),
        Project::new("2", "SocialHub")
            .with_subtitle("Event-Driven Social Platform")
            .with_description(
                "Designed 8-microservice architecture (Auth, Users, Posts, Feed, Chat, Notifications, \
                 VC, Gateway) processing 500+ msg/sec via Apache Kafka.",
            )
            .with_tech(strings(&[
                "Node.js",
                "Kafka",
                "Redis",
                "LangChain",
                "Kubernetes",
                "Docker",
                "Google GenAI",
            ]))
            .with_github("https://github.com/keshav-sudo/")
            .with_date("Aug 2025")
            .with_highlights(strings(&[
                "500+ msg/sec via Apache Kafka",
                "60% DB load reduction with Redis caching",
                "99.9% uptime with Kubernetes orchestration",
            ]))
            .with_color(ProjectColor::Cyan),
        Project::new("3", "Kurser")
            .with_subtitle("Cloud Deployment Platform")
            .with_description(
                "Engineered Vercel-like PaaS deploying React apps in <45 seconds using Nixpacks \
                 builds with BullMQ + Redis job queues.",
            )
            .with_tech(strings(&[
                "TypeScript",
                "Azure",
                "BullMQ",
                "Redis",
                "Mongoose",
                "Nixpacks",
                "GitHub Webhooks",
            ]))
            .with_github("https://github.com/keshav-sudo/")
            .with_date("Nov 2025")
            .with_highlights(strings(&[
                "<45 second deployments",
                "Azure Blob Storage CDN delivery",
                "Automated CI/CD via GitHub webhooks",
            ]))
            .with_color(ProjectColor::Pink),
    ]
}
