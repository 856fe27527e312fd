//! Demonstration data loaded at startup. Every insert is a no-op when the row
//! is already present, so seeding an existing database changes nothing.

use anyhow::Context;
use tracing::{debug, info};

use crate::{
    auth::password::PasswordHasher,
    db::{Database, Table},
};

struct SeedUser {
    name: &'static str,
    email: &'static str,
    password: &'static str,
    role: &'static str,
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price: f64,
    category: &'static str,
    stock: i64,
    image_url: &'static str,
}

struct SeedTutorial {
    title: &'static str,
    description: &'static str,
    content: &'static str,
    difficulty: &'static str,
    category: &'static str,
    duration: i64,
}

const USERS: &[SeedUser] = &[
    SeedUser { name: "Juan Pérez", email: "juan@email.com", password: "password123", role: "admin" },
    SeedUser { name: "María García", email: "maria@email.com", password: "password123", role: "user" },
    SeedUser { name: "Carlos López", email: "carlos@email.com", password: "password123", role: "user" },
    SeedUser { name: "Ana Martínez", email: "ana@email.com", password: "password123", role: "user" },
    SeedUser { name: "Admin Sistema", email: "admin@apilearning.com", password: "admin123", role: "admin" },
    SeedUser { name: "Desarrollador Frontend", email: "frontend@dev.com", password: "frontend123", role: "user" },
    SeedUser { name: "Desarrollador Backend", email: "backend@dev.com", password: "backend123", role: "user" },
];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Laptop Gaming",
        description: "Laptop para gaming de alta gama",
        price: 1299.99,
        category: "Electrónicos",
        stock: 15,
        image_url: "/images/laptop.jpg",
    },
    SeedProduct {
        name: "Smartphone Pro",
        description: "Teléfono inteligente con cámara profesional",
        price: 899.99,
        category: "Electrónicos",
        stock: 25,
        image_url: "/images/phone.jpg",
    },
    SeedProduct {
        name: "Auriculares Bluetooth",
        description: "Auriculares inalámbricos con cancelación de ruido",
        price: 199.99,
        category: "Audio",
        stock: 50,
        image_url: "/images/headphones.jpg",
    },
    SeedProduct {
        name: "Tablet 10\"",
        description: "Tablet de 10 pulgadas para trabajo y entretenimiento",
        price: 399.99,
        category: "Electrónicos",
        stock: 30,
        image_url: "/images/tablet.jpg",
    },
    SeedProduct {
        name: "Smartwatch",
        description: "Reloj inteligente con monitor de salud",
        price: 249.99,
        category: "Wearables",
        stock: 40,
        image_url: "/images/watch.jpg",
    },
    SeedProduct {
        name: "Monitor 4K",
        description: "Monitor 4K de 27 pulgadas para diseño y programación",
        price: 599.99,
        category: "Electrónicos",
        stock: 20,
        image_url: "/images/monitor.jpg",
    },
    SeedProduct {
        name: "Teclado Mecánico",
        description: "Teclado mecánico RGB para gaming y programación",
        price: 149.99,
        category: "Accesorios",
        stock: 35,
        image_url: "/images/keyboard.jpg",
    },
    SeedProduct {
        name: "Mouse Gaming",
        description: "Mouse gaming de alta precisión con sensor óptico",
        price: 79.99,
        category: "Accesorios",
        stock: 45,
        image_url: "/images/mouse.jpg",
    },
    SeedProduct {
        name: "Webcam HD",
        description: "Webcam HD 1080p para videoconferencias",
        price: 89.99,
        category: "Accesorios",
        stock: 25,
        image_url: "/images/webcam.jpg",
    },
    SeedProduct {
        name: "Disco SSD 1TB",
        description: "Disco SSD de 1TB para almacenamiento rápido",
        price: 129.99,
        category: "Almacenamiento",
        stock: 30,
        image_url: "/images/ssd.jpg",
    },
];

const TUTORIALS: &[SeedTutorial] = &[
    SeedTutorial {
        title: "¿Qué es una API?",
        description: "Introducción básica a las APIs y su importancia",
        content: "Una API (Application Programming Interface) es un conjunto de reglas y \
                  protocolos que permite que diferentes aplicaciones se comuniquen entre sí...",
        difficulty: "beginner",
        category: "Conceptos Básicos",
        duration: 15,
    },
    SeedTutorial {
        title: "Métodos HTTP: GET, POST, PUT, DELETE",
        description: "Aprende los métodos HTTP más importantes",
        content: "Los métodos HTTP definen qué acción queremos realizar en un recurso específico...",
        difficulty: "beginner",
        category: "HTTP",
        duration: 25,
    },
    SeedTutorial {
        title: "Autenticación con JWT",
        description: "Implementa autenticación segura en tus APIs",
        content: "JSON Web Tokens (JWT) es un estándar abierto que define una forma compacta \
                  y autónoma...",
        difficulty: "intermediate",
        category: "Seguridad",
        duration: 35,
    },
    SeedTutorial {
        title: "Códigos de Estado HTTP",
        description: "Comprende los códigos de respuesta HTTP más importantes",
        content: "Los códigos de estado HTTP son números de tres dígitos que indican el \
resultado de una petición HTTP.

**Códigos 2xx - Éxito:**
- 200 OK: La petición fue exitosa
- 201 Created: Recurso creado exitosamente
- 204 No Content: Éxito sin contenido de respuesta

**Códigos 4xx - Error del cliente:**
- 400 Bad Request: Petición malformada
- 401 Unauthorized: Autenticación requerida
- 403 Forbidden: Acceso prohibido
- 404 Not Found: Recurso no encontrado
- 409 Conflict: Conflicto con el estado actual

**Códigos 5xx - Error del servidor:**
- 500 Internal Server Error: Error interno del servidor
- 502 Bad Gateway: Error de gateway
- 503 Service Unavailable: Servicio no disponible",
        difficulty: "beginner",
        category: "HTTP",
        duration: 20,
    },
    SeedTutorial {
        title: "Diseño de APIs RESTful",
        description: "Principios y mejores prácticas para diseñar APIs REST",
        content: "REST (Representational State Transfer) es un estilo arquitectónico para \
diseñar APIs web.

**Principios REST:**
1. **Stateless**: Cada petición debe contener toda la información necesaria
2. **Uniform Interface**: Interfaz uniforme y consistente
3. **Client-Server**: Separación clara entre cliente y servidor
4. **Cacheable**: Las respuestas deben ser cacheables cuando sea apropiado

**Estructura de URLs:**
- GET /api/users - Obtener todos los usuarios
- GET /api/users/123 - Obtener usuario específico
- POST /api/users - Crear nuevo usuario
- PUT /api/users/123 - Actualizar usuario
- DELETE /api/users/123 - Eliminar usuario",
        difficulty: "intermediate",
        category: "Diseño",
        duration: 45,
    },
    SeedTutorial {
        title: "Manejo de Errores en APIs",
        description: "Estrategias para manejar errores de forma consistente",
        content: "El manejo adecuado de errores es crucial para una buena experiencia de usuario.

**Estructura de Respuesta de Error:**
```json
{
  \"success\": false,
  \"error\": \"Tipo de error\",
  \"message\": \"Descripción del error\",
  \"details\": \"Información adicional\"
}
```

**Tipos de Errores Comunes:**
1. Errores de Validación (400)
2. Errores de Autenticación (401)
3. Errores de Autorización (403)
4. Errores de Recursos (404)",
        difficulty: "intermediate",
        category: "Manejo de Errores",
        duration: 30,
    },
    SeedTutorial {
        title: "Seguridad en APIs",
        description: "Implementa medidas de seguridad esenciales en tus APIs",
        content: "La seguridad es fundamental en el desarrollo de APIs modernas.

**Medidas de Seguridad Esenciales:**
1. Autenticación y Autorización (JWT, OAuth 2.0, API Keys)
2. HTTPS (encriptación en tránsito)
3. Rate Limiting (limitar peticiones por IP)
4. Validación de Entrada (sanitizar y validar datos)
5. Headers de Seguridad (CORS, Content Security Policy, X-Frame-Options)
6. Logging y Monitoreo",
        difficulty: "advanced",
        category: "Seguridad",
        duration: 50,
    },
    SeedTutorial {
        title: "Testing de APIs",
        description: "Aprende a probar tus APIs de forma efectiva",
        content: "El testing es esencial para garantizar la calidad y confiabilidad de las APIs.

**Tipos de Testing:**
1. Unit Testing: probar funciones individuales
2. Integration Testing: probar endpoints completos
3. End-to-End Testing: flujos completos de usuario

**Mejores Prácticas:**
- Usar datos de prueba consistentes
- Limpiar la base de datos entre tests
- Probar casos de éxito y error
- Automatizar tests en CI/CD",
        difficulty: "advanced",
        category: "Testing",
        duration: 40,
    },
];

const ORDERS: &[(i64, f64, &str)] = &[
    (1, 1299.99, "completed"),
    (2, 899.99, "pending"),
    (3, 449.98, "shipped"),
];

/// Inserts the demonstration rows that are not present yet.
pub async fn seed(db: &Database, hasher: &PasswordHasher) -> anyhow::Result<()> {
    for user in USERS {
        let existing: Option<(i64,)> = db
            .query_one("SELECT id FROM users WHERE email = ?", &[user.email.into()])
            .await?;
        if existing.is_some() {
            continue;
        }
        let hash = hasher
            .hash(user.password.to_owned())
            .await
            .with_context(|| format!("hash seed password for {}", user.email))?;
        db.execute(
            "INSERT OR IGNORE INTO users (name, email, password, role) VALUES (?, ?, ?, ?)",
            &[user.name.into(), user.email.into(), hash.into(), user.role.into()],
        )
        .await?;
        debug!(email = user.email, "seeded user");
    }

    for p in PRODUCTS {
        db.execute(
            "INSERT INTO products (name, description, price, category, stock, image_url) \
             SELECT ?, ?, ?, ?, ?, ? \
             WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = ?)",
            &[
                p.name.into(),
                p.description.into(),
                p.price.into(),
                p.category.into(),
                p.stock.into(),
                p.image_url.into(),
                p.name.into(),
            ],
        )
        .await?;
    }

    for t in TUTORIALS {
        db.execute(
            "INSERT INTO tutorials (title, description, content, difficulty, category, duration) \
             SELECT ?, ?, ?, ?, ?, ? \
             WHERE NOT EXISTS (SELECT 1 FROM tutorials WHERE title = ?)",
            &[
                t.title.into(),
                t.description.into(),
                t.content.into(),
                t.difficulty.into(),
                t.category.into(),
                t.duration.into(),
                t.title.into(),
            ],
        )
        .await?;
    }

    for &(user_id, total, status) in ORDERS {
        db.execute(
            "INSERT INTO orders (user_id, total, status) \
             SELECT ?, ?, ? \
             WHERE NOT EXISTS (SELECT 1 FROM orders WHERE user_id = ? AND total = ? AND status = ?)",
            &[
                user_id.into(),
                total.into(),
                status.into(),
                user_id.into(),
                total.into(),
                status.into(),
            ],
        )
        .await?;
    }

    let users = db.count(Table::Users).await?;
    let products = db.count(Table::Products).await?;
    let tutorials = db.count(Table::Tutorials).await?;
    let orders = db.count(Table::Orders).await?;
    info!(users, products, tutorials, orders, "seed complete");
    Ok(())
}
